use anyhow::Result;
use std::fmt::Write;

use crate::engine::AnalysisResult;

pub fn render_json(results: &[AnalysisResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

pub fn render_text(results: &[AnalysisResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_result(&mut out, result);
    }
    out
}

fn write_result(out: &mut String, result: &AnalysisResult) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", result.source_id);
    let _ = writeln!(out, "  frames            {}", result.frame_count);
    let _ = writeln!(out, "  average ZCR       {:.2}", result.average_zcr);
    let _ = writeln!(out, "  average centroid  {}", hz_or_none(result.average_centroid));
    let _ = writeln!(out, "  average rolloff   {}", hz_or_none(result.average_rolloff));
    let _ = writeln!(out, "  top bins (mean)   {}", hz_list(&result.top_bins_by_mean));
    let _ = writeln!(out, "  top bins (std)    {}", hz_list(&result.top_bins_by_std));
}

fn hz_or_none(value: Option<f64>) -> String {
    match value {
        Some(hz) => format!("{:.1} Hz", hz),
        None => "n/a (silent)".to_string(),
    }
}

fn hz_list(bins: &[f64]) -> String {
    if bins.is_empty() {
        return "-".to_string();
    }
    bins.iter()
        .map(|hz| format!("{:.1}", hz))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            source_id: "song.mp3".into(),
            frame_count: 53,
            average_zcr: 121.5,
            average_centroid: Some(1834.25),
            average_rolloff: None,
            top_bins_by_mean: vec![2153.3203125, 0.0],
            top_bins_by_std: vec![],
        }
    }

    #[test]
    fn text_report_lists_every_field() {
        let text = render_text(&[sample()]);
        assert!(text.starts_with("song.mp3\n"));
        assert!(text.contains("frames            53"));
        assert!(text.contains("average ZCR       121.50"));
        assert!(text.contains("average centroid  1834.2 Hz") || text.contains("average centroid  1834.3 Hz"));
        assert!(text.contains("average rolloff   n/a (silent)"));
        assert!(text.contains("top bins (mean)   2153.3, 0.0"));
        assert!(text.contains("top bins (std)    -"));
    }

    #[test]
    fn json_report_uses_result_field_names() {
        let json = render_json(&[sample()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["source_id"], "song.mp3");
        assert_eq!(first["frame_count"], 53);
        assert_eq!(first["average_rolloff"], serde_json::Value::Null);
        assert_eq!(first["top_bins_by_mean"][0], 2153.3203125);

        let parsed: Vec<AnalysisResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![sample()]);
    }
}
