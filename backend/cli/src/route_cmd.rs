//! CLI Route Command
//!
//! Classifies a prompt and prints the routing decision as JSON.

use anyhow::Result;
use kvforge_routing::PromptRouter;

pub async fn run(router: &PromptRouter, prompt: &str, context: Option<&str>) -> Result<()> {
    let decision = router.route(prompt, context).await;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
