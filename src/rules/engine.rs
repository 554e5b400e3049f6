//! Ordered first-match rule evaluation.
//!
//! A `RuleList` holds `(predicate, result)` rules sorted by ascending
//! priority. Equal priorities keep insertion order. Evaluation stops at the
//! first rule whose predicate holds, so later rules are unreachable once an
//! earlier one matches.
//!
//! The list is generic over the predicate and result types: thinkset
//! inference and the per-thinkset play tables share it.

use serde::{Deserialize, Serialize};

/// Something that can be checked against a context.
pub trait Predicate<C: ?Sized> {
    fn matches(&self, ctx: &C) -> bool;
}

impl<C: ?Sized, F> Predicate<C> for F
where
    F: Fn(&C) -> bool,
{
    fn matches(&self, ctx: &C) -> bool {
        self(ctx)
    }
}

/// One rule: when `when` holds, the answer is `then`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule<P, R> {
    pub id: String,
    /// Lower runs first.
    pub priority: u32,
    pub when: P,
    pub then: R,
}

impl<P, R> Rule<P, R> {
    #[must_use]
    pub fn new(id: &str, priority: u32, when: P, then: R) -> Self {
        Self {
            id: id.to_string(),
            priority,
            when,
            then,
        }
    }
}

/// Priority-ordered rules.
///
/// ```
/// use duel21::rules::{Rule, RuleList};
///
/// type Check = fn(&u8) -> bool;
///
/// let mut rules: RuleList<Check, &str> = RuleList::new();
/// rules.push(Rule::new("low", 20, (|t: &u8| *t < 12) as Check, "draw"));
/// rules.push(Rule::new("bust", 10, (|t: &u8| *t > 21) as Check, "lost"));
///
/// assert_eq!(rules.evaluate(&25), Some(&"lost"));
/// assert_eq!(rules.evaluate(&8), Some(&"draw"));
/// assert_eq!(rules.evaluate(&17), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleList<P, R> {
    rules: Vec<Rule<P, R>>,
}

impl<P, R> Default for RuleList<P, R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<P, R> RuleList<P, R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert after every rule of equal or lower priority.
    pub fn push(&mut self, rule: Rule<P, R>) {
        let at = self.rules.partition_point(|r| r.priority <= rule.priority);
        self.rules.insert(at, rule);
    }

    #[must_use]
    pub fn with(mut self, rule: Rule<P, R>) -> Self {
        self.push(rule);
        self
    }

    /// First rule that matches `ctx`.
    pub fn first_match<C>(&self, ctx: &C) -> Option<&Rule<P, R>>
    where
        C: ?Sized,
        P: Predicate<C>,
    {
        self.rules.iter().find(|r| r.when.matches(ctx))
    }

    /// Result of the first matching rule.
    pub fn evaluate<C>(&self, ctx: &C) -> Option<&R>
    where
        C: ?Sized,
        P: Predicate<C>,
    {
        self.first_match(ctx).map(|r| &r.then)
    }

    /// Result of the first matching rule, or `fallback`.
    pub fn evaluate_or<'a, C>(&'a self, ctx: &C, fallback: &'a R) -> &'a R
    where
        C: ?Sized,
        P: Predicate<C>,
    {
        self.evaluate(ctx).unwrap_or(fallback)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule<P, R>> {
        self.rules.iter()
    }
}

impl<P, R> FromIterator<Rule<P, R>> for RuleList<P, R> {
    fn from_iter<I: IntoIterator<Item = Rule<P, R>>>(iter: I) -> Self {
        let mut rules: Vec<Rule<P, R>> = iter.into_iter().collect();
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Check = fn(&i32) -> bool;

    fn positive(x: &i32) -> bool {
        *x > 0
    }

    fn big(x: &i32) -> bool {
        *x > 100
    }

    fn always(_: &i32) -> bool {
        true
    }

    #[test]
    fn test_priority_order_beats_insertion_order() {
        let rules: RuleList<Check, &str> = RuleList::new()
            .with(Rule::new("positive", 50, positive as Check, "positive"))
            .with(Rule::new("big", 10, big as Check, "big"));

        assert_eq!(rules.evaluate(&500), Some(&"big"));
        assert_eq!(rules.evaluate(&5), Some(&"positive"));
        assert_eq!(rules.evaluate(&-5), None);
    }

    #[test]
    fn test_equal_priority_keeps_insertion_order() {
        let rules: RuleList<Check, u8> = RuleList::new()
            .with(Rule::new("first", 10, always as Check, 1))
            .with(Rule::new("second", 10, always as Check, 2));

        assert_eq!(rules.first_match(&0).map(|r| r.id.as_str()), Some("first"));
    }

    #[test]
    fn test_later_rules_unreachable_after_match() {
        let rules: RuleList<Check, &str> = [
            Rule::new("catch-all", 1, always as Check, "baseline"),
            Rule::new("big", 2, big as Check, "big"),
        ]
        .into_iter()
        .collect();

        assert_eq!(rules.evaluate(&1000), Some(&"baseline"));
    }

    #[test]
    fn test_fallback() {
        let rules: RuleList<Check, &str> = RuleList::new();
        assert!(rules.is_empty());
        assert_eq!(*rules.evaluate_or(&3, &"default"), "default");
    }
}
