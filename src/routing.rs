//! Subject classification — emergency vs. normal routing.

use crate::config::RoutingConfig;

/// Where a message's notification goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision<'a> {
    /// Fan out to every emergency destination, in configured order.
    Emergency(&'a [String]),
    /// Single send to the main destination.
    Normal(&'a str),
}

/// Classify a subject line.
///
/// Emergency iff the subject is exactly equal to a configured phrase —
/// case-sensitive, no trimming, no substring matching. Pure function.
pub fn classify<'a>(subject: &str, routing: &'a RoutingConfig) -> RoutingDecision<'a> {
    if routing.emergency_phrases.iter().any(|p| p == subject) {
        RoutingDecision::Emergency(&routing.emergency_dsts)
    } else {
        RoutingDecision::Normal(&routing.main_dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routing(phrases: &[&str]) -> RoutingConfig {
        RoutingConfig {
            main_dst: "5551111".into(),
            emergency_dsts: vec!["5552222".into(), "5553333".into()],
            emergency_phrases: phrases.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn exact_match_is_emergency() {
        let cfg = routing(&["URGENT"]);
        let decision = classify("URGENT", &cfg);
        assert_eq!(
            decision,
            RoutingDecision::Emergency(&cfg.emergency_dsts)
        );
    }

    #[test]
    fn emergency_destinations_keep_configured_order() {
        let cfg = routing(&["URGENT"]);
        match classify("URGENT", &cfg) {
            RoutingDecision::Emergency(dsts) => {
                assert_eq!(dsts, ["5552222".to_string(), "5553333".to_string()]);
            }
            RoutingDecision::Normal(_) => panic!("expected emergency"),
        }
    }

    #[test]
    fn case_mismatch_is_normal() {
        let cfg = routing(&["URGENT"]);
        assert_eq!(classify("urgent", &cfg), RoutingDecision::Normal("5551111"));
    }

    #[test]
    fn no_trimming_before_match() {
        let cfg = routing(&["URGENT"]);
        assert_eq!(
            classify("URGENT ", &cfg),
            RoutingDecision::Normal("5551111")
        );
        assert_eq!(
            classify(" URGENT", &cfg),
            RoutingDecision::Normal("5551111")
        );
    }

    #[test]
    fn substring_is_not_a_match() {
        let cfg = routing(&["URGENT"]);
        assert_eq!(
            classify("URGENT: disk full", &cfg),
            RoutingDecision::Normal("5551111")
        );
    }

    #[test]
    fn any_phrase_in_list_matches() {
        let cfg = routing(&["URGENT", "Server Down"]);
        assert!(matches!(
            classify("Server Down", &cfg),
            RoutingDecision::Emergency(_)
        ));
    }

    #[test]
    fn empty_phrase_list_never_matches() {
        let cfg = routing(&[]);
        assert_eq!(classify("URGENT", &cfg), RoutingDecision::Normal("5551111"));
    }

    #[test]
    fn classify_is_idempotent() {
        let cfg = routing(&["URGENT"]);
        assert_eq!(classify("URGENT", &cfg), classify("URGENT", &cfg));
        assert_eq!(classify("hello", &cfg), classify("hello", &cfg));
    }
}
