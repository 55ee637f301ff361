use std::fs;
use std::path::Path;

use serde::Deserialize;

use pd_core::{DecodeOptions, PayloadInput, ZoneMetadata};

/// On-disk job: extracted payload plus optional decode options.
#[derive(Debug, Deserialize)]
struct RawJob {
    mask: String,
    data: String,
    zones: ZoneMetadata,
    #[serde(default)]
    options: Option<DecodeOptions>,
}

#[derive(Debug)]
pub struct JobFile {
    pub input: PayloadInput,
    pub options: Option<DecodeOptions>,
}

pub fn parse_job(text: &str) -> Result<JobFile, String> {
    let raw: RawJob = serde_json::from_str(text).map_err(|e| format!("Invalid job file: {}", e))?;
    Ok(JobFile {
        input: PayloadInput {
            mask: raw.mask,
            data: raw.data,
            zones: raw.zones,
        },
        options: raw.options,
    })
}

pub fn read_job(path: &Path) -> Result<JobFile, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    parse_job(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::EntryLayout;

    #[test]
    fn parses_job_without_options() {
        let job = parse_job(r#"{"mask": "!!!!", "data": "sA ", "zones": {"ru": {"3": 1}}}"#).unwrap();
        assert_eq!(job.input.mask, "!!!!");
        assert!(job.options.is_none());
    }

    #[test]
    fn parses_job_with_options() {
        let job = parse_job(
            r#"{"mask": "!!", "data": "", "zones": {},
                "options": {"layout": {"kind": "fixed_width"}, "budget": {"max_chunk": 512}}}"#,
        )
        .unwrap();
        let options = job.options.unwrap();
        assert_eq!(options.layout, EntryLayout::FixedWidth);
        assert_eq!(options.budget.max_chunk, 512);
        assert_eq!(options.budget.bytes_per_entry, 25);
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(parse_job(r#"{"mask": "!!"}"#).is_err());
    }
}
