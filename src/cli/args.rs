use clap::{Parser, ValueEnum};

use crate::error_handling::types::ArgsError;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    #[value(name = "get_order")]
    GetOrder,
    #[value(name = "get_bill")]
    GetBill,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::GetOrder => "get_order",
            Action::GetBill => "get_bill",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version)]
#[command(about = "Order billing pipeline with optional blob-storage persistence")]
pub struct CliArgs {
    #[arg(value_enum)]
    pub action: Action,

    #[arg(long = "order_id")]
    pub order_id: Option<String>,

    /// Output from the get_order action.
    #[arg(long = "order_data")]
    pub order_data: Option<String>,

    #[arg(long = "output_file")]
    pub output_file: String,

    #[arg(long, default_value_t = false)]
    pub upload: bool,

    /// KEY=VALUE pairs (delimited by ';' or newline) exported into the
    /// process environment before anything else runs.
    #[arg(long = "env_vars")]
    pub env_vars: Option<String>,
}

/// Checks that the arguments the selected action needs were passed and are
/// non-empty.
pub fn validate_for_action(args: &CliArgs) -> Result<(), ArgsError> {
    let required: &[(&str, &Option<String>)] = match args.action {
        Action::GetOrder => &[("order_id", &args.order_id)],
        Action::GetBill => &[("order_data", &args.order_data)],
    };

    let missing: Vec<String> = required
        .iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ArgsError::ArgumentMissing {
            missing,
            action: args.action.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parses_get_order_invocation() {
        let args = parse(&[
            "tally",
            "get_order",
            "--order_id",
            "A001",
            "--output_file",
            "./output.json",
            "--upload",
        ]);
        assert_eq!(args.action, Action::GetOrder);
        assert_eq!(args.order_id.as_deref(), Some("A001"));
        assert!(args.upload);
        validate_for_action(&args).unwrap();
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(CliArgs::try_parse_from(["tally", "get_total", "--output_file", "o"]).is_err());
    }

    #[test]
    fn missing_action_argument_is_reported() {
        let args = parse(&["tally", "get_order", "--output_file", "./output.json"]);
        let err = validate_for_action(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter[\"order_id\"] is required for action<get_order>."
        );
    }

    #[test]
    fn empty_action_argument_counts_as_missing() {
        let args = parse(&[
            "tally",
            "get_bill",
            "--order_data",
            "",
            "--output_file",
            "./output.json",
        ]);
        let err = validate_for_action(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter[\"order_data\"] is required for action<get_bill>."
        );
    }
}
