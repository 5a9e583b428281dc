//! The closed vocabulary of step annotations.
//!
//! Every step a front-end renders carries exactly one of these kinds; the
//! serialized form uses the SCREAMING_SNAKE names below.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    AddFractions,
    CommonDenominator,
    MultiplyFractions,
    SimplifyFraction,
    DividePolyTerm,
    CombineLikeTerms,
    MultiplyPolyTerms,
    Distribute,
    Cancel,
    Arithmetic,
    ResolveAddUnaryMinus,
    DoubleUnaryMinus,
    AbsoluteValue,
    SubtractFromBothSides,
    AddToBothSides,
    MultiplyBothSides,
    DivideFromBothSides,
    SwapSides,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::AddFractions => "ADD_FRACTIONS",
            ChangeKind::CommonDenominator => "COMMON_DENOMINATOR",
            ChangeKind::MultiplyFractions => "MULTIPLY_FRACTIONS",
            ChangeKind::SimplifyFraction => "SIMPLIFY_FRACTION",
            ChangeKind::DividePolyTerm => "DIVIDE_POLY_TERM",
            ChangeKind::CombineLikeTerms => "COMBINE_LIKE_TERMS",
            ChangeKind::MultiplyPolyTerms => "MULTIPLY_POLY_TERMS",
            ChangeKind::Distribute => "DISTRIBUTE",
            ChangeKind::Cancel => "CANCEL",
            ChangeKind::Arithmetic => "ARITHMETIC",
            ChangeKind::ResolveAddUnaryMinus => "RESOLVE_ADD_UNARY_MINUS",
            ChangeKind::DoubleUnaryMinus => "DOUBLE_UNARY_MINUS",
            ChangeKind::AbsoluteValue => "ABSOLUTE_VALUE",
            ChangeKind::SubtractFromBothSides => "SUBTRACT_FROM_BOTH_SIDES",
            ChangeKind::AddToBothSides => "ADD_TO_BOTH_SIDES",
            ChangeKind::MultiplyBothSides => "MULTIPLY_BOTH_SIDES",
            ChangeKind::DivideFromBothSides => "DIVIDE_FROM_BOTH_SIDES",
            ChangeKind::SwapSides => "SWAP_SIDES",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
