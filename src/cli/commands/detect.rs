use anyhow::{Result, bail};
use exitcode::ExitCode;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::api::PlantApiClient;
use crate::config::{ResolveOptions, load_resolved};
use crate::fs::atomic_write;
use crate::input::ImageReader;
use crate::session::{PlantRecord, SessionController, SessionError};
use crate::status;
use crate::ui::{Spinner, Style, report};

pub struct DetectOptions {
    pub image: Option<PathBuf>,
    pub server: ResolveOptions,
    pub save: Option<PathBuf>,
    pub json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    image: &'a str,
    fingerprint: &'a str,
    plants: &'a [PlantRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

/// Identifies the plants in one image and prints them.
///
/// Finding no plant is not an error. A failing service exits with
/// `UNAVAILABLE`; input that is not an image exits with `DATAERR`.
pub async fn run_detect(options: DetectOptions) -> Result<ExitCode> {
    let Some(path) = options.image.as_deref() else {
        bail!(
            "No image provided\n\n\
             Usage:\n  \
             plantid <IMAGE>     identify the plants in a photo\n  \
             plantid chat        open the interactive shell"
        );
    };

    let image = match ImageReader::read(path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("{} {e:#}", Style::error("Error:"));
            return Ok(input_exit_code(&e));
        }
    };

    let config = load_resolved(&options.server)?;
    let client = PlantApiClient::from_config(&config)?;
    let mut controller: SessionController<PlantApiClient> = SessionController::new(client);

    controller.set_image_source(image);
    controller.request_detection()?;

    let spinner = Spinner::new(&format!("Identifying plant via {}...", config.endpoint));
    controller.next_settled().await;
    spinner.stop();

    let state = controller.state();
    let (Some(result), Some(image)) = (state.detection(), state.image()) else {
        eprintln!(
            "{} Detection failed: {}",
            Style::error("Error:"),
            state.error().unwrap_or("no response from the detection service")
        );
        return Ok(exitcode::UNAVAILABLE);
    };

    let saved_to = match &options.save {
        Some(target) => {
            save_annotated(target, &result.annotated_image)?;
            status!("Saved annotated image to {}", target.display());
            Some(target.display().to_string())
        }
        None => None,
    };

    if options.json {
        let json = JsonReport {
            image: image.display_url(),
            fingerprint: image.fingerprint(),
            plants: &result.plants,
            saved_to,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        report::print_detection(result);
    }

    Ok(exitcode::OK)
}

fn save_annotated(target: &Path, annotated: &[u8]) -> Result<()> {
    if annotated.is_empty() {
        bail!("The service returned no annotated image");
    }
    atomic_write(target, annotated)
}

fn input_exit_code(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<SessionError>().is_some() {
        exitcode::DATAERR
    } else if err.downcast_ref::<std::io::Error>().is_some() {
        exitcode::NOINPUT
    } else {
        exitcode::DATAERR
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_input_exit_code_not_an_image() {
        let err = anyhow::Error::from(SessionError::NotAnImage {
            name: "notes.txt".to_string(),
            mime_type: "unknown format".to_string(),
        });
        assert_eq!(input_exit_code(&err), exitcode::DATAERR);
    }

    #[test]
    fn test_input_exit_code_missing_file() {
        let err = anyhow::Error::from(io::Error::from(io::ErrorKind::NotFound))
            .context("Failed to access file: leaf.jpg");
        assert_eq!(input_exit_code(&err), exitcode::NOINPUT);
    }

    #[test]
    fn test_save_annotated_rejects_empty_image() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let target = temp_dir.path().join("out.jpg");

        assert!(save_annotated(&target, &[]).is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_json_report_shape() {
        let plants = vec![PlantRecord {
            name: "Neem".to_string(),
            scientific_name: "Azadirachta indica".to_string(),
            common_name: "Neem".to_string(),
            local_name: "Vepa".to_string(),
            family_name: "Meliaceae".to_string(),
            genus: "Azadirachta".to_string(),
            native_location: "Indian subcontinent".to_string(),
            medicinal_uses: "antiseptic".to_string(),
            error: None,
        }];
        let report = JsonReport {
            image: "leaf.jpg",
            fingerprint: "abc",
            plants: &plants,
            saved_to: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["plants"][0]["family_name"], "Meliaceae");
        assert!(value.get("saved_to").is_none());
        assert!(value["plants"][0].get("error").is_none());
    }
}
