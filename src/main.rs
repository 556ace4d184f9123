//! Compare the Noto fonts in an Android system image against upstream.

use notodiff::core;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args = core::platform::get_cli_args();
    if let Err(error) = core::run_app(cli_args).await {
        core::platform::handle_error(error);
    }
}
