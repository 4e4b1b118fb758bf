use openapi2crd_crd::PrinterColumn;

use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

fn column(name: &str, json_path: &str) -> PrinterColumn {
    PrinterColumn {
        name: name.to_string(),
        type_: "string".to_string(),
        json_path: json_path.to_string(),
        description: None,
    }
}

/// Printer columns surfacing the `Ready` and `State` conditions
#[derive(Debug, Default)]
pub struct PrintConditions;

impl MappingPlugin for PrintConditions {
    fn name(&self) -> &'static str {
        "print_conditions"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        request.crd.spec.additional_printer_columns = vec![
            column("Ready", r#".status.conditions[?(@.type=="Ready")].status"#),
            column("Reason", r#".status.conditions[?(@.type=="Ready")].reason"#),
            column("State", r#".status.conditions[?(@.type=="State")].reason"#),
        ];
        Ok(())
    }
}
