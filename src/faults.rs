// src/faults.rs
//! Fault injection: a closed catalog of deliberately incorrect pipeline
//! behaviors, used to produce known-bad compiler variants for testing and
//! grading tooling.
//!
//! The enabled set is an explicit, immutable [`FaultConfig`] value threaded
//! into every stage entry point; there is no ambient registry.

use std::fmt;

/// The pipeline stage a fault belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Parser,
    Analysis,
    Interpreter,
}

/// A named mutation point in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Fault {
    // lexer faults
    MissingTokenElse,
    MissingTokenWhile,
    WrongTokenIf,
    WrongTokenPlus,
    NoEqualsToken,
    WrongRegexAnd,
    AdditionalSkip,

    // parser faults
    MissingTreeElse,
    MissingAlternativeNotEquals,
    MissingAlternativeCallStmt,
    AdditionalSemicolonReturn,
    MissingCommaArguments,
    SwappedOperandsPlus,
    RightAssociativeAddExpr,

    // analysis faults
    MissingSymbolCallee,
    MissingTypeTypeName,
    MissingCheckReturnVoid,
    MissingCheckReturnNonVoid,
    WrongOrderSymbolTable,

    // interpreter faults
    DivByZero,
    NoShortcutOr,
    NoShortcutAnd,
    MissingInitGlobals,
    WrongShiftMul,
}

impl Fault {
    /// Every fault in the catalog, in declaration order.
    pub const ALL: [Fault; 24] = [
        Fault::MissingTokenElse,
        Fault::MissingTokenWhile,
        Fault::WrongTokenIf,
        Fault::WrongTokenPlus,
        Fault::NoEqualsToken,
        Fault::WrongRegexAnd,
        Fault::AdditionalSkip,
        Fault::MissingTreeElse,
        Fault::MissingAlternativeNotEquals,
        Fault::MissingAlternativeCallStmt,
        Fault::AdditionalSemicolonReturn,
        Fault::MissingCommaArguments,
        Fault::SwappedOperandsPlus,
        Fault::RightAssociativeAddExpr,
        Fault::MissingSymbolCallee,
        Fault::MissingTypeTypeName,
        Fault::MissingCheckReturnVoid,
        Fault::MissingCheckReturnNonVoid,
        Fault::WrongOrderSymbolTable,
        Fault::DivByZero,
        Fault::NoShortcutOr,
        Fault::NoShortcutAnd,
        Fault::MissingInitGlobals,
        Fault::WrongShiftMul,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fault::MissingTokenElse => "missing_token_else",
            Fault::MissingTokenWhile => "missing_token_while",
            Fault::WrongTokenIf => "wrong_token_if",
            Fault::WrongTokenPlus => "wrong_token_plus",
            Fault::NoEqualsToken => "no_equals_token",
            Fault::WrongRegexAnd => "wrong_regex_and",
            Fault::AdditionalSkip => "additional_skip",
            Fault::MissingTreeElse => "missing_tree_else",
            Fault::MissingAlternativeNotEquals => "missing_alternative_not_equals",
            Fault::MissingAlternativeCallStmt => "missing_alternative_call_stmt",
            Fault::AdditionalSemicolonReturn => "additional_semicolon_return",
            Fault::MissingCommaArguments => "missing_comma_arguments",
            Fault::SwappedOperandsPlus => "swapped_operands_plus",
            Fault::RightAssociativeAddExpr => "right_associative_add_expr",
            Fault::MissingSymbolCallee => "missing_symbol_callee",
            Fault::MissingTypeTypeName => "missing_type_type_name",
            Fault::MissingCheckReturnVoid => "missing_check_return_void",
            Fault::MissingCheckReturnNonVoid => "missing_check_return_non_void",
            Fault::WrongOrderSymbolTable => "wrong_order_symbol_table",
            Fault::DivByZero => "div_by_zero",
            Fault::NoShortcutOr => "no_shortcut_or",
            Fault::NoShortcutAnd => "no_shortcut_and",
            Fault::MissingInitGlobals => "missing_init_globals",
            Fault::WrongShiftMul => "wrong_shift_mul",
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Fault::MissingTokenElse
            | Fault::MissingTokenWhile
            | Fault::WrongTokenIf
            | Fault::WrongTokenPlus
            | Fault::NoEqualsToken
            | Fault::WrongRegexAnd
            | Fault::AdditionalSkip => Stage::Lexer,
            Fault::MissingTreeElse
            | Fault::MissingAlternativeNotEquals
            | Fault::MissingAlternativeCallStmt
            | Fault::AdditionalSemicolonReturn
            | Fault::MissingCommaArguments
            | Fault::SwappedOperandsPlus
            | Fault::RightAssociativeAddExpr => Stage::Parser,
            Fault::MissingSymbolCallee
            | Fault::MissingTypeTypeName
            | Fault::MissingCheckReturnVoid
            | Fault::MissingCheckReturnNonVoid
            | Fault::WrongOrderSymbolTable => Stage::Analysis,
            Fault::DivByZero
            | Fault::NoShortcutOr
            | Fault::NoShortcutAnd
            | Fault::MissingInitGlobals
            | Fault::WrongShiftMul => Stage::Interpreter,
        }
    }

    pub fn from_name(name: &str) -> Option<Fault> {
        Fault::ALL.iter().copied().find(|fault| fault.name() == name)
    }
}

/// The immutable set of enabled faults for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultConfig {
    bits: u32,
}

impl FaultConfig {
    /// No faults enabled: the correct pipeline.
    pub const NONE: FaultConfig = FaultConfig { bits: 0 };

    pub fn new() -> Self {
        Self::NONE
    }

    /// All faults of every stage.
    pub fn all() -> Self {
        Fault::ALL
            .iter()
            .fold(Self::NONE, |config, fault| config.with(*fault))
    }

    /// All faults of one stage.
    pub fn all_of(stage: Stage) -> Self {
        Fault::ALL
            .iter()
            .filter(|fault| fault.stage() == stage)
            .fold(Self::NONE, |config, fault| config.with(*fault))
    }

    pub fn with(self, fault: Fault) -> Self {
        Self {
            bits: self.bits | (1 << fault as u32),
        }
    }

    pub fn union(self, other: FaultConfig) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub fn is_enabled(&self, fault: Fault) -> bool {
        self.bits & (1 << fault as u32) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Fault> + '_ {
        Fault::ALL
            .iter()
            .copied()
            .filter(move |fault| self.is_enabled(*fault))
    }

    /// Parse a comma-separated fault list, e.g. `div_by_zero,missing_token_else`.
    pub fn parse_list(list: &str) -> Result<Self, String> {
        let mut config = Self::NONE;
        for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            match Fault::from_name(name) {
                Some(fault) => config = config.with(fault),
                None => return Err(format!("unknown fault '{name}'")),
            }
        }
        Ok(config)
    }
}

impl fmt::Display for FaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for fault in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", fault.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for fault in Fault::ALL {
            assert_eq!(Fault::from_name(fault.name()), Some(fault));
        }
        assert_eq!(Fault::from_name("no_such_fault"), None);
    }

    #[test]
    fn enable_and_query() {
        let config = FaultConfig::new()
            .with(Fault::DivByZero)
            .with(Fault::MissingTokenElse);
        assert!(config.is_enabled(Fault::DivByZero));
        assert!(!config.is_enabled(Fault::NoShortcutOr));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn all_of_stage_selects_only_that_stage() {
        let config = FaultConfig::all_of(Stage::Lexer);
        assert_eq!(config.len(), 7);
        for fault in config.iter() {
            assert_eq!(fault.stage(), Stage::Lexer);
        }
    }

    #[test]
    fn all_enables_the_whole_catalog() {
        assert_eq!(FaultConfig::all().len(), Fault::ALL.len());
    }

    #[test]
    fn parse_list_accepts_names_and_rejects_unknown() {
        let config = FaultConfig::parse_list("div_by_zero, no_shortcut_or").unwrap();
        assert!(config.is_enabled(Fault::DivByZero));
        assert!(config.is_enabled(Fault::NoShortcutOr));
        assert!(FaultConfig::parse_list("bogus").is_err());
    }

    #[test]
    fn display_joins_names() {
        let config = FaultConfig::new()
            .with(Fault::DivByZero)
            .with(Fault::MissingTokenElse);
        assert_eq!(config.to_string(), "missing_token_else, div_by_zero");
    }
}
