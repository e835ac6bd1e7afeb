use brace::{compile, tokenize, tree::Node, Syntax};
use proptest::prelude::*;

/// Pieces that are glued together into templates which are usually valid.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z \n]{0,8}",
        Just("{{ x }}".to_owned()),
        Just("{{- \"s\\nt\" +}}".to_owned()),
        Just("{% if a %}".to_owned()),
        Just("{% else %}".to_owned()),
        Just("{% endif %}".to_owned()),
        Just("{%^ do f(1,\n 2) *%}".to_owned()),
        Just("{# note\n #}".to_owned()),
        Just("{% set y = [1, z] %}".to_owned()),
    ]
}

fn lines(nodes: &[Node], found: &mut Vec<usize>) {
    for node in nodes {
        found.push(node.line());
        if let Node::If(node) = node {
            for branch in &node.branches {
                lines(&branch.nodes, found);
            }
            if let Some(nodes) = &node.else_branch {
                lines(nodes, found);
            }
        }
    }
}

proptest! {
    #[test]
    fn tag_free_text_is_one_node(source in "[^{]{1,64}") {
        let nodes = compile(&source).unwrap().nodes;

        prop_assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::Text(text) => prop_assert_eq!(&text.text, &source),
            node => prop_assert!(false, "expected text, found {:?}", node),
        }
    }

    #[test]
    fn token_lines_never_decrease(fragments in prop::collection::vec(fragment(), 0..12)) {
        let source = fragments.concat();
        let tokens = tokenize(&source, "prop", &Syntax::default()).unwrap();

        for pair in tokens.windows(2) {
            prop_assert!(pair[0].line <= pair[1].line);
        }
    }

    #[test]
    fn node_lines_never_decrease(fragments in prop::collection::vec(fragment(), 0..12)) {
        let source = fragments.concat();

        if let Ok(template) = compile(&source) {
            let mut found = vec![];
            lines(&template.nodes, &mut found);

            for pair in found.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
