use anyhow::{bail, Result};
use plotflow::config::Config;
use plotflow::gemini::GeminiClient;
use plotflow::render::SvgRenderer;
use plotflow::service::FlowchartService;
use std::env;

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  plotflow health                          Check API key and model availability");
    eprintln!("  plotflow generate <description>          Print Mermaid source for a description");
    eprintln!("  plotflow svg <description>               Generate and render to an SVG file");
    eprintln!("  plotflow multi <description> [name ...]  Ensemble + per-character flowcharts (JSON)");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else { usage() };

    let config = Config::load()?;
    let client = GeminiClient::new(&config.gemini)?;
    let service = FlowchartService::new(Box::new(client), SvgRenderer::new(&config.renderer));

    match command.as_str() {
        "health" => {
            let health = service.health_check().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !health.available {
                bail!("no eligible text generation model available");
            }
        }
        "generate" => {
            let description = args.get(1..).filter(|rest| !rest.is_empty()).map(|rest| rest.join(" "));
            let Some(description) = description else { usage() };
            let mermaid_code = service.from_description(&description).await?;
            println!("{}", mermaid_code);
        }
        "svg" => {
            let description = args.get(1..).filter(|rest| !rest.is_empty()).map(|rest| rest.join(" "));
            let Some(description) = description else { usage() };
            let svg_path = service.render_svg(&description).await?;
            println!("{}", svg_path.display());
        }
        "multi" => {
            let Some(description) = args.get(1) else { usage() };
            let character_names: Vec<String> = args[2..].to_vec();
            let result = service.generate_multiple(description, &character_names).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => usage(),
    }

    Ok(())
}
