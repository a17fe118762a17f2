// AWS Lambda binary entry point
//
// Build with: cargo build -p gluedeploy-lambda --release
//
// The lambda_runtime crate drives the tokio runtime started here.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    gluedeploy_lambda::run().await
}
