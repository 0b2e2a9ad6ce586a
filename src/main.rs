#[tokio::main]
async fn main() -> anyhow::Result<()> {
    impact_sim_lib::run().await
}
