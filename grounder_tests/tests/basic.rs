use grounder::config::{ChoiceFeedback, Config};
use grounder::error::Grounding;
use grounder_tests::{atoms_are_fully_resolved, derives, ground_text, ground_text_with, try_ground_text};

mod facts {
    use super::*;

    #[test]
    fn facts_pass_through_unchanged() {
        let program = ground_text("p(1). p(2). p(3).");
        assert_eq!(program.rules.len(), 3);
        assert!(program.is_ground());
        assert_eq!(derives(&program, "p"), 3);
    }
}

mod simple_rule {
    use super::*;

    #[test]
    fn a_rule_over_facts_derives_one_instance_per_match() {
        let program = ground_text(
            "edge(1,2).
             edge(2,3).
             edge(3,1).
             path(X,Y) :- edge(X,Y).",
        );
        assert_eq!(derives(&program, "edge"), 3);
        assert_eq!(derives(&program, "path"), 3);
        assert!(program.is_ground());
    }

    #[test]
    fn chained_rules_across_strata_derive_transitively() {
        let program = ground_text(
            "edge(1,2).
             edge(2,3).
             path(X,Y) :- edge(X,Y).
             path(X,Z) :- path(X,Y), edge(Y,Z).",
        );
        assert_eq!(derives(&program, "path"), 3, "(1,2) (2,3) and (1,3)");
    }
}

mod builtin_filter {
    use super::*;

    #[test]
    fn a_comparison_literal_filters_candidate_substitutions() {
        let program = ground_text(
            "n(1). n(2). n(3). n(4). n(5).
             big(X) :- n(X), X > 3.",
        );
        assert_eq!(derives(&program, "big"), 2, "only 4 and 5 clear the guard");
    }

    #[test]
    fn an_equality_literal_binds_its_free_variable_from_arithmetic() {
        let program = ground_text(
            "n(3).
             double(X,Y) :- n(X), Y = X + X.",
        );
        assert_eq!(derives(&program, "double"), 1);
        let text = program.to_string();
        assert!(text.contains("double(3,6)"), "Y should be bound to the evaluated sum: {text}");
    }

    #[test]
    fn a_constraint_built_from_a_bound_equality_retains_its_original_expression() {
        // Mirrors the worked example: the evaluated value binds Y, but the
        // body literal still shows the expression that was checked.
        let program = ground_text("n(1). n(2). n(3). :- n(X), n(Y), Y = X + 1.");
        let text = program.to_string();
        assert!(text.contains("2 = 1+1"), "got: {text}");
        assert!(text.contains("3 = 2+1"), "got: {text}");
    }
}

mod choice_head {
    use super::*;

    #[test]
    fn a_choice_head_is_instantiated_once_per_candidate_element() {
        use grounder::program::Head;

        let program = ground_text("p(1). p(2). p(3). 1 { q(X) : p(X) } 2.");
        let choice_rules: Vec<_> = program
            .rules
            .iter()
            .filter(|r| matches!(&r.head, Head::Choice(_)))
            .collect();
        assert_eq!(choice_rules.len(), 1);

        let Head::Choice(choice) = &choice_rules[0].head else {
            unreachable!()
        };
        assert_eq!(choice.elements.len(), 3);
        assert!(choice.lower.is_some());
        assert!(choice.upper.is_some());
    }

    #[test]
    fn conservative_choice_feedback_does_not_feed_the_same_stratum() {
        let mut config = Config::default();
        config.choice_feedback = ChoiceFeedback::Conservative;
        let program = ground_text_with(
            "p(1). p(2).
             1 { q(X) : p(X) } 2.
             r(X) :- q(X).",
            &config,
        );
        assert_eq!(derives(&program, "r"), 0, "q is never a fact, only possibly chosen");
    }
}

mod aggregate {
    use super::*;

    #[test]
    fn a_count_aggregate_guard_is_evaluated_per_outer_binding() {
        let program = ground_text(
            "group(1). group(2).
             p(1,a). p(1,b). p(2,a).
             big_group(X) :- group(X), #count{ Y : p(X,Y) } >= 2.",
        );
        assert_eq!(derives(&program, "big_group"), 1, "only X=1 has two elements");
    }

    #[test]
    fn the_emitted_aggregate_literal_carries_its_enumerated_elements() {
        use grounder::atom::Literal;
        use grounder::program::Head;

        let program = ground_text(
            "group(1). group(2).
             p(1,a). p(1,b). p(2,a).
             big_group(X) :- group(X), #count{ Y : p(X,Y) } >= 2.",
        );
        assert!(atoms_are_fully_resolved(&program), "no free variable should remain in any element");

        let rule = program
            .rules
            .iter()
            .find(|r| matches!(&r.head, Head::Disjunction(atoms) if atoms[0].predicate.as_ref() == "big_group"))
            .expect("big_group(1) should be derived");
        let Literal::Aggregate(agg) = rule
            .body
            .iter()
            .find(|l| matches!(l, Literal::Aggregate(_)))
            .expect("rule should keep its aggregate literal")
        else {
            unreachable!()
        };
        assert_eq!(agg.elements.len(), 2, "X=1 has two matching (X,Y) pairs: a and b");
    }
}

mod negation {
    use super::*;

    #[test]
    fn negation_across_a_stratum_only_sees_the_settled_predicate() {
        let program = ground_text("a(1). a(2). b(X) :- a(X), not c(X).");
        assert_eq!(derives(&program, "b"), 2, "c is never derived, so nothing is excluded");
    }

    #[test]
    fn a_present_fact_excludes_its_negated_instance() {
        let program = ground_text("p(1). p(2). q(1). r(X) :- p(X), not q(X).");
        let text = program.to_string();
        assert!(text.contains("r(2) :- p(2), not q(2)."), "got: {text}");
        assert!(!text.contains("r(1)"), "q(1) holds so r(1) must not be derived: {text}");
    }

    #[test]
    fn a_constraint_eliminates_nothing_from_the_output_but_is_itself_emitted() {
        let program = ground_text("a(1). :- a(1), a(1).");
        assert_eq!(derives(&program, "a"), 1);
        assert_eq!(program.rules.len(), 2, "the fact plus the one grounded constraint");
    }
}

mod invariants {
    use super::*;

    #[test]
    fn output_has_no_free_variables() {
        let program = ground_text(
            "edge(1,2). edge(2,3).
             path(X,Y) :- edge(X,Y).
             path(X,Z) :- path(X,Y), edge(Y,Z).",
        );
        for rule in &program.rules {
            let mut vars = Vec::new();
            rule.free_vars(&mut vars);
            assert!(vars.is_empty(), "rule has free variables: {rule}");
        }
    }

    #[test]
    fn output_atoms_carry_no_unresolved_arithmetic() {
        // `Y` is bound from `X + 1`, so `m`'s own argument is a plain
        // number; only the builtin literal that computed it still shows
        // the expression that was checked.
        let program = ground_text("n(1). n(2). m(X,Y) :- n(X), Y = X + 1.");
        assert!(atoms_are_fully_resolved(&program));
        assert!(program.to_string().contains("m(1,2)"));
    }

    #[test]
    fn grounding_twice_yields_the_same_rendered_program() {
        let text = "edge(1,2). edge(2,3). edge(3,1). path(X,Y) :- edge(X,Y). path(X,Z) :- path(X,Y), edge(Y,Z).";
        let a = ground_text(text);
        let b = ground_text(text);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn input_facts_survive_into_the_output() {
        let program = ground_text("seed(1). seed(2). derived(X) :- seed(X).");
        assert_eq!(derives(&program, "seed"), 2);
    }

    #[test]
    fn an_unsafe_rule_aborts_before_any_rule_is_emitted() {
        let result = try_ground_text("p(X) :- q(1).");
        assert!(matches!(result, Err(Grounding::Safety(_))));
    }

    #[test]
    fn grounding_an_already_ground_program_returns_it_unchanged() {
        let text = "p(1). q(2) :- p(1).";
        let first = ground_text(text).to_string();
        let second = ground_text(&first).to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn adding_a_fact_only_grows_the_ground_program() {
        let smaller = ground_text("n(1). n(2). big(X) :- n(X), X > 0.");
        let bigger = ground_text("n(1). n(2). n(3). big(X) :- n(X), X > 0.");
        assert!(bigger.rules.len() > smaller.rules.len());
        for rule in &smaller.rules {
            assert!(bigger.rules.contains(rule), "monotone: {rule} should survive");
        }
    }
}
