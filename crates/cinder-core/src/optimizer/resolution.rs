use crate::ast::{BinaryOp, ExprKey};

/// Whether an operand runs every time its enclosing statement runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Evaluation {
    #[default]
    Unconditional,
    Conditional,
}

impl Evaluation {
    /// Evaluation of the right operand of `op` given the evaluation of the
    /// whole expression. The left operand always inherits `self`, so a left
    /// operand nested inside another short-circuit's right side stays
    /// conditional.
    pub fn right_operand(self, op: BinaryOp) -> Evaluation {
        if op.is_short_circuit() {
            Evaluation::Conditional
        } else {
            self
        }
    }

    pub fn is_unconditional(self) -> bool {
        self == Evaluation::Unconditional
    }
}

pub const RESOLVED_PLACEHOLDER_PREFIX: &str = "_rph_";
pub const FILTERED_PLACEHOLDER_PREFIX: &str = "_fph";

/// Preferred alias name for a cached computation
///
/// Names are derived from the key alone so that sibling branches computing
/// the same value pick the same alias.
pub fn alias_name(key: &ExprKey) -> String {
    match key {
        ExprKey::Placeholder(name) => format!("{}{}", RESOLVED_PLACEHOLDER_PREFIX, name),
        _ => {
            let digest = blake3::hash(key.to_string().as_bytes());
            let hex = digest.to_hex();
            format!(
                "{}{}",
                FILTERED_PLACEHOLDER_PREFIX,
                hex.as_str()[..8].to_ascii_uppercase()
            )
        }
    }
}
