//! Plain-text rendering of the client state.

use std::fmt::Write as _;

use chrono::Local;
use dashboard_client::{ClientState, TrackedInstrument};

/// Group the integer part by thousands and keep at most two fraction
/// digits, without trailing zeros.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// One line per instrument.
pub fn render_card(instrument: &TrackedInstrument) -> String {
    let label = format!("{:<10} {:<10}", instrument.display_name, instrument.symbol);

    if instrument.is_loading {
        return format!("{label} Loading...");
    }
    if instrument.price <= 0.0 {
        return format!("{label} No data");
    }

    let sign = if instrument.change >= 0.0 { "+" } else { "" };
    format!(
        "{label} {:>12}  {sign}{} ({sign}{:.2}%)",
        format_number(instrument.price),
        format_number(instrument.change),
        instrument.change_percent
    )
}

pub fn render_state(state: &ClientState) -> String {
    let mut out = String::new();

    for instrument in &state.instruments {
        let _ = writeln!(out, "{}", render_card(instrument));
    }
    out.push('\n');

    match state.last_update {
        Some(at) => {
            let _ = writeln!(
                out,
                "Last update: {}",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
        }
        None => out.push_str("Last update: -\n"),
    }
    if let Some(source) = &state.data_source {
        let _ = writeln!(out, "Source: {source}");
    }
    if state.is_loading {
        out.push_str("Refreshing...\n");
    }
    if let Some(error) = &state.error_message {
        let _ = writeln!(out, "Error: {error}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(price: f64, change: f64, change_percent: f64) -> TrackedInstrument {
        TrackedInstrument {
            price,
            change,
            change_percent,
            is_loading: false,
            ..TrackedInstrument::new("^KS11", "KOSPI")
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2500.5), "2,500.5");
        assert_eq!(format_number(1380.257), "1,380.26");
        assert_eq!(format_number(35000.0), "35,000");
        assert_eq!(format_number(1234567.891), "1,234,567.89");
        assert_eq!(format_number(14.2), "14.2");
        assert_eq!(format_number(-12.3), "-12.3");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_format_number_small_negatives() {
        // Anything that rounds to zero drops its sign.
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(-0.004), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-0.01), "-0.01");
        assert_eq!(format_number(-0.5), "-0.5");
    }

    #[test]
    fn test_card_states() {
        let loading = TrackedInstrument::new("^VIX", "VIX");
        assert!(render_card(&loading).ends_with("Loading..."));

        let empty = loaded(0.0, 0.0, 0.0);
        assert!(render_card(&empty).ends_with("No data"));
    }

    #[test]
    fn test_card_signs() {
        let up = render_card(&loaded(2500.5, 12.3, 0.49));
        assert!(up.contains("2,500.5"), "{up}");
        assert!(up.ends_with("+12.3 (+0.49%)"), "{up}");

        let down = render_card(&loaded(1380.0, -2.1, -0.15));
        assert!(down.ends_with("-2.1 (-0.15%)"), "{down}");
    }

    #[test]
    fn test_state_footer() {
        let mut state = ClientState::new(vec![loaded(2500.5, 12.3, 0.49)]);
        state.data_source = Some("X".to_string());
        state.error_message = Some("Failed to load market data.".to_string());

        let text = render_state(&state);

        assert!(text.contains("Last update: -"));
        assert!(text.contains("Source: X"));
        assert!(text.contains("Error: Failed to load market data."));
        assert!(!text.contains("Refreshing..."));
    }
}
