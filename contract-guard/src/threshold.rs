//! Numeric threshold algebra for metric checks.
//!
//! A [`Threshold`] is a predicate over a numeric metric: a single-sided
//! bound, an explicit (not-)between range, or a pair of single-sided bounds
//! that is reinterpreted as a range. [`Threshold::render`] produces the
//! canonical textual predicate consumed by the query engine.

use serde::Serialize;
use serde_json::Number;

/// An inclusive numeric range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    pub lower_bound: Number,
    pub upper_bound: Number,
}

/// A numeric predicate over a metric value.
///
/// The check fails when the metric value violates the rendered predicate;
/// evaluation itself happens in the query engine, never here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Threshold {
    pub greater_than: Option<Number>,
    pub greater_than_or_equal: Option<Number>,
    pub less_than: Option<Number>,
    pub less_than_or_equal: Option<Number>,
    pub equal: Option<Number>,
    pub not_equal: Option<Number>,
    pub between: Option<Range>,
    pub not_between: Option<Range>,
}

fn numeric(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

impl Threshold {
    /// Returns true when no bound of any kind is configured.
    pub fn is_empty(&self) -> bool {
        self.greater_than.is_none()
            && self.greater_than_or_equal.is_none()
            && self.less_than.is_none()
            && self.less_than_or_equal.is_none()
            && self.equal.is_none()
            && self.not_equal.is_none()
            && self.between.is_none()
            && self.not_between.is_none()
    }

    /// Renders the canonical textual predicate, or `None` when no threshold
    /// is configured. Callers substitute a `"?"` placeholder for `None`.
    ///
    /// When both a greater-bound and a less-bound are set, the pair is
    /// reinterpreted as a range. A crossed pair (greater-bound above the
    /// less-bound) deliberately becomes a *not between* over the interval
    /// between them: a user giving an inverted pair means "outside this
    /// interval". Bound inclusivity follows the field that was populated:
    /// the `_or_equal` variant closes the bound, the strict variant opens it.
    pub fn render(&self) -> Option<String> {
        let greater_bound = self
            .greater_than
            .as_ref()
            .or(self.greater_than_or_equal.as_ref());
        let less_bound = self.less_than.as_ref().or(self.less_than_or_equal.as_ref());

        if let (Some(greater), Some(less)) = (greater_bound, less_bound) {
            return Some(if numeric(greater) > numeric(less) {
                render_range(
                    true,
                    less,
                    self.less_than_or_equal.is_some(),
                    greater,
                    self.greater_than_or_equal.is_some(),
                )
            } else {
                render_range(
                    false,
                    greater,
                    self.greater_than_or_equal.is_some(),
                    less,
                    self.less_than_or_equal.is_some(),
                )
            });
        }
        if let Some(between) = &self.between {
            return Some(render_range(
                false,
                &between.lower_bound,
                true,
                &between.upper_bound,
                true,
            ));
        }
        if let Some(not_between) = &self.not_between {
            return Some(render_range(
                true,
                &not_between.lower_bound,
                true,
                &not_between.upper_bound,
                true,
            ));
        }
        if let Some(n) = &self.greater_than {
            return Some(format!("> {n}"));
        }
        if let Some(n) = &self.greater_than_or_equal {
            return Some(format!(">= {n}"));
        }
        if let Some(n) = &self.less_than {
            return Some(format!("< {n}"));
        }
        if let Some(n) = &self.less_than_or_equal {
            return Some(format!("<= {n}"));
        }
        if let Some(n) = &self.equal {
            return Some(format!("= {n}"));
        }
        if let Some(n) = &self.not_equal {
            return Some(format!("!= {n}"));
        }
        None
    }
}

/// Renders `"[not ]between [(]<lower> and <upper>[)]"`; a parenthesis next to
/// a bound marks that bound as open.
fn render_range(
    is_not_between: bool,
    lower_bound: &Number,
    lower_bound_included: bool,
    upper_bound: &Number,
    upper_bound_included: bool,
) -> String {
    let optional_not = if is_not_between { "not " } else { "" };
    let lower_bracket = if lower_bound_included { "" } else { "(" };
    let upper_bracket = if upper_bound_included { "" } else { ")" };
    format!("{optional_not}between {lower_bracket}{lower_bound} and {upper_bound}{upper_bracket}")
}
