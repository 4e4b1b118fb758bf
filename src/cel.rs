//! CEL rule synthesis for CRD validation rules

use openapi2crd_crd::ValidationRule;

/// `self.<field>` presence test
fn has(field: &str) -> String {
    format!("has(self.{field})")
}

/// Rule satisfied when exactly one of `fields` is set.
///
/// Produces one clause per field, each asserting that field and negating all
/// others: `(has(self.a) && !has(self.b)) || (!has(self.a) && has(self.b))`.
pub fn exactly_one_of(fields: &[&str]) -> String {
    match fields {
        [] => "false".to_string(),
        [single] => has(single),
        _ => fields
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let terms: Vec<String> = fields
                    .iter()
                    .enumerate()
                    .map(|(j, field)| {
                        if i == j {
                            has(field)
                        } else {
                            format!("!{}", has(field))
                        }
                    })
                    .collect();
                format!("({})", terms.join(" && "))
            })
            .collect::<Vec<_>>()
            .join(" || "),
    }
}

/// Validation rule requiring exactly one of `fields`
pub fn exactly_one_of_rule(fields: &[&str]) -> ValidationRule {
    let quoted: Vec<String> = fields.iter().map(|f| format!("{f:?}")).collect();
    ValidationRule::new(
        exactly_one_of(fields),
        format!("exactly one of {} must be set", quoted.join(", ")),
    )
}

/// Value may not change once set
pub fn immutable() -> &'static str {
    "self == oldSelf"
}

/// Immutability rule with the conventional message for `name`
pub fn immutable_rule(name: &str) -> ValidationRule {
    ValidationRule::new(immutable(), format!("{name} cannot be modified after creation"))
}

/// Rule requiring `dependency` whenever `field` is set
pub fn required_if(field: &str, dependency: &str) -> String {
    format!(
        "({} && {}) || (!{})",
        has(field),
        has(dependency),
        has(field)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_of_two_fields() {
        assert_eq!(
            exactly_one_of(&["v1", "v2"]),
            "(has(self.v1) && !has(self.v2)) || (!has(self.v1) && has(self.v2))"
        );
    }

    #[test]
    fn test_exactly_one_of_clause_shape() {
        let rule = exactly_one_of(&["a", "b", "c"]);
        let clauses: Vec<&str> = rule.split(" || ").collect();
        assert_eq!(clauses.len(), 3);
        for clause in clauses {
            assert_eq!(clause.matches("!has(").count(), 2, "{clause}");
            assert_eq!(clause.matches("has(").count(), 3, "{clause}");
        }
    }

    #[test]
    fn test_exactly_one_of_degenerate() {
        assert_eq!(exactly_one_of(&[]), "false");
        assert_eq!(exactly_one_of(&["only"]), "has(self.only)");
    }

    #[test]
    fn test_exactly_one_of_rule_message() {
        let rule = exactly_one_of_rule(&["groupId", "groupRef"]);
        assert_eq!(rule.message, r#"exactly one of "groupId", "groupRef" must be set"#);
    }

    #[test]
    fn test_required_if() {
        assert_eq!(
            required_if("v20250312.groupId", "connectionSecretRef"),
            "(has(self.v20250312.groupId) && has(self.connectionSecretRef)) || (!has(self.v20250312.groupId))"
        );
    }

    #[test]
    fn test_immutable_rule() {
        let rule = immutable_rule("projectOwnerId");
        assert_eq!(rule.rule, "self == oldSelf");
        assert_eq!(rule.message, "projectOwnerId cannot be modified after creation");
    }
}
