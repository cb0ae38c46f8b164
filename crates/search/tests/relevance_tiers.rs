use critique_protocol::{NodeType, Violation};
use critique_search::{ContextAnalyzer, RelevanceScorer, TreeNode};
use critique_serializer::{DesignNode, SerializerConfig, TreeSerializer};
use proptest::prelude::*;

fn distinct_keywords() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-y]{2,8}", 1..6).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn proptest_exact_name_outranks_name_substring_outranks_text(
        keywords in distinct_keywords(),
        pick in any::<prop::sample::Index>(),
    ) {
        let scorer = RelevanceScorer::default();
        let chosen = pick.get(&keywords).clone();

        let exact = DesignNode::leaf("exact", &chosen, NodeType::Instance);
        let substring = DesignNode::leaf("substring", &format!("z{chosen}z"), NodeType::Instance);
        let text = DesignNode::text("text", "z", &keywords.join(" "));

        let exact_score = scorer.score_node(&exact, &keywords);
        let substring_score = scorer.score_node(&substring, &keywords);
        let text_score = scorer.score_node(&text, &keywords);

        prop_assert!(exact_score > substring_score);
        prop_assert!(substring_score > text_score);
        prop_assert!(text_score > 0);
    }
}

#[test]
fn scorer_walks_serialized_payloads_too() {
    let tree = DesignNode::container("1:1", "Checkout", NodeType::Frame)
        .with_child(DesignNode::text("1:2", "Submit Button", "Submit"))
        .with_child(DesignNode::text("1:3", "Hidden Copy", "Submit").hidden());
    let payload = TreeSerializer::new(SerializerConfig::default()).serialize_frames(&[tree]);

    let report = Violation::titled(r#"Missing label on "Submit Button""#);
    let found = RelevanceScorer::default()
        .locate(&payload, &report)
        .expect("serialized text node matches");
    assert_eq!(found.node_id(), "1:2");
}

#[test]
fn analyzer_and_scorer_share_one_payload() {
    let tree = DesignNode::container("1:1", "Login", NodeType::Frame)
        .with_child(DesignNode::text("1:2", "Title", "Sign in"))
        .with_child(DesignNode::text("1:3", "Password Field", "Password"))
        .with_child(DesignNode::leaf("1:4", "Login Button", NodeType::Instance));
    let payload = TreeSerializer::new(SerializerConfig::default()).serialize_frames(&[tree]);

    let context = ContextAnalyzer::default().analyze(&payload, Some("mobile app"), true);
    assert_eq!(context.design_type, critique_protocol::DesignType::Authentication);
    assert!(context.has_interactive_elements);
    assert_eq!(context.user_context, "mobile app");

    let report = Violation::titled(r#""Password Field" has weak affordance"#);
    let found = RelevanceScorer::default().locate(&payload, &report);
    assert_eq!(found.map(TreeNode::node_id), Some("1:3"));
}
