use crate::config::RendererConfig;
use crate::error::FlowchartError;
use log::debug;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::process::Command;

/// Renders Mermaid source to SVG by shelling out to the mermaid CLI.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    command: String,
}

impl SvgRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }

    /// Writes the source to a temp file, runs `<command> -i <in> -o <out>`
    /// and returns the SVG path. The input file is removed on every exit
    /// path; the caller owns deletion of the output file after reading it.
    pub async fn render(&self, mermaid_code: &str) -> Result<PathBuf, FlowchartError> {
        let temp_id: u64 = rand::random();
        let temp_dir = std::env::temp_dir();
        let input_path = temp_dir.join(format!("diagram_{:016x}.mmd", temp_id));
        let output_path = temp_dir.join(format!("diagram_{:016x}.svg", temp_id));

        fs::write(&input_path, mermaid_code).await?;

        debug!("Rendering diagram via {} -i {:?}", self.command, input_path);

        let result = Command::new(&self.command)
            .arg("-i")
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path)
            .output()
            .await;

        let _ = fs::remove_file(&input_path).await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FlowchartError::RendererUnavailable(self.command.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            return Err(FlowchartError::RenderFailure(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(command: &str) -> SvgRenderer {
        SvgRenderer::new(&RendererConfig {
            command: command.to_string(),
        })
    }

    #[tokio::test]
    async fn test_missing_executable_is_renderer_unavailable() {
        let result = renderer("definitely-not-a-real-mermaid-cli")
            .render("flowchart TD\n  A-->B")
            .await;
        assert!(matches!(
            result,
            Err(FlowchartError::RendererUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_render_failure() {
        // `false` accepts the arguments and exits 1.
        let result = renderer("false").render("flowchart TD\n  A-->B").await;
        assert!(matches!(result, Err(FlowchartError::RenderFailure(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_returns_svg_path() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        // Stand-in for mmdc that copies its -i argument to its -o argument.
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("fake-mmdc");
        let mut script = std::fs::File::create(&script_path).unwrap();
        writeln!(script, "#!/bin/sh\ncp \"$2\" \"$4\"").unwrap();
        drop(script);
        let mut perms = std::fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script_path, perms).unwrap();

        let svg_path = renderer(script_path.to_str().unwrap())
            .render("flowchart TD\n  A-->B")
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&svg_path).unwrap(),
            "flowchart TD\n  A-->B"
        );
        std::fs::remove_file(svg_path).unwrap();
    }

    #[tokio::test]
    async fn test_input_file_cleaned_up_after_failure() {
        let marker = "flowchart TD\n  CLEANUP_MARKER_7f3a";
        let _ = renderer("false").render(marker).await;

        let leftover = std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                name.starts_with("diagram_") && name.ends_with(".mmd")
            })
            .any(|e| {
                std::fs::read_to_string(e.path())
                    .map(|content| content == marker)
                    .unwrap_or(false)
            });
        assert!(!leftover, "temp input file should be removed");
    }
}
