#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::test_support::*;
    use crate::transform::{template_to_typescript, TransformOptions};
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn assert_parses(code: &str) {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_typescript(true).with_module(true);
        let ret = Parser::new(&allocator, code, source_type).parse();
        assert!(
            ret.errors.is_empty(),
            "emitted code failed to parse: {:?}\n{}",
            ret.errors,
            code
        );
    }

    #[test]
    fn empty_frame_parses() {
        let src = "";
        let options = TransformOptions {
            type_params: Some("<T extends string>".to_string()),
            context_type: Some("MyComponent<T>".to_string()),
            preamble: vec!["import MyComponent from \"./my-component\";".to_string()],
            ..TransformOptions::default()
        };
        let result = template_to_typescript(src, &template(src, vec![]), &options);
        assert_parses(&result.result.expect("emits code").code);
    }

    #[test]
    fn fallback_heavy_template_parses() {
        let src = r#"{{greet "hi"}}{{obj.foo-bar.baz}}{{@user.name}}"#;
        let result = transform(
            src,
            vec![
                mustache_node(
                    src,
                    "{{greet \"hi\"}}",
                    path_expr(src, "greet"),
                    vec![string_lit(src, "hi")],
                    hash(vec![]),
                ),
                mustache_node(
                    src,
                    "{{obj.foo-bar.baz}}",
                    path_expr(src, "obj.foo-bar.baz"),
                    vec![],
                    hash(vec![]),
                ),
                mustache_node(
                    src,
                    "{{@user.name}}",
                    path_expr(src, "@user.name"),
                    vec![],
                    hash(vec![]),
                ),
            ],
        );
        assert_parses(&result.result.expect("emits code").code);
    }

    #[test]
    fn component_with_named_blocks_parses() {
        let src = "<Card @title={{this.title}}><:header as |h|>{{h}}</:header><:body as |b|>{{yield b}}</:body></Card>";
        let header = ElementNode {
            tag: ":header".to_string(),
            attributes: vec![],
            modifiers: vec![],
            children: vec![mustache_node(
                src,
                "{{h}}",
                path_expr(src, "h"),
                vec![],
                hash(vec![]),
            )],
            block_params: vec!["h".to_string()],
            self_closing: false,
            loc: span(src, "<:header as |h|>{{h}}</:header>"),
        };
        let body = ElementNode {
            tag: ":body".to_string(),
            attributes: vec![],
            modifiers: vec![],
            children: vec![mustache_node(
                src,
                "{{yield b}}",
                path_expr(src, "yield"),
                vec![path_expr(src, "b")],
                hash(vec![]),
            )],
            block_params: vec!["b".to_string()],
            self_closing: false,
            loc: span(src, "<:body as |b|>{{yield b}}</:body>"),
        };
        let card = ElementNode {
            tag: "Card".to_string(),
            attributes: vec![AttrNode {
                name: "@title".to_string(),
                value: AttrValue::Mustache(mustache(
                    src,
                    "{{this.title}}",
                    path_expr(src, "this.title"),
                    vec![],
                    hash(vec![]),
                )),
                loc: span(src, "@title={{this.title}}"),
            }],
            modifiers: vec![],
            children: vec![ContentNode::Element(header), ContentNode::Element(body)],
            block_params: vec![],
            self_closing: false,
            loc: span(src, src),
        };
        let result = transform(src, vec![ContentNode::Element(card)]);
        assert_parses(&result.result.expect("emits code").code);
    }

    #[test]
    fn control_flow_and_element_statements_parse() {
        let src = "{{#if this.ready}}<div {{track this.item}} class=\"a{{this.kind}}\">{{yield}}</div>{{else}}{{this.wait}}{{/if}}";
        let element = ElementNode {
            tag: "div".to_string(),
            attributes: vec![AttrNode {
                name: "class".to_string(),
                value: AttrValue::Concat(ConcatStatement {
                    parts: vec![
                        ConcatPart::Text(TextNode {
                            chars: "a".to_string(),
                            loc: span(src, "a{{"),
                        }),
                        ConcatPart::Mustache(mustache(
                            src,
                            "{{this.kind}}",
                            path_expr(src, "this.kind"),
                            vec![],
                            hash(vec![]),
                        )),
                    ],
                    loc: span(src, "\"a{{this.kind}}\""),
                }),
                loc: span(src, "class=\"a{{this.kind}}\""),
            }],
            modifiers: vec![ElementModifierStatement {
                path: path(src, "track"),
                params: vec![path_expr(src, "this.item")],
                hash: hash(vec![]),
                loc: span(src, "{{track this.item}}"),
            }],
            children: vec![mustache_node(
                src,
                "{{yield}}",
                path_expr(src, "yield"),
                vec![],
                hash(vec![]),
            )],
            block_params: vec![],
            self_closing: false,
            loc: span(src, "<div {{track this.item}} class=\"a{{this.kind}}\">{{yield}}</div>"),
        };
        let block = BlockStatement {
            path: path(src, "if"),
            params: vec![path_expr(src, "this.ready")],
            hash: hash(vec![]),
            program: Block {
                body: vec![ContentNode::Element(element)],
                block_params: vec![],
                chained: false,
                loc: SourceSpan::default(),
            },
            inverse: Some(Block {
                body: vec![mustache_node(
                    src,
                    "{{this.wait}}",
                    path_expr(src, "this.wait"),
                    vec![],
                    hash(vec![]),
                )],
                block_params: vec![],
                chained: false,
                loc: span(src, "{{this.wait}}"),
            }),
            loc: span(src, src),
        };
        let result = transform(src, vec![ContentNode::Block(block)]);
        assert_parses(&result.result.expect("emits code").code);
    }

    #[test]
    fn generic_block_invocation_parses() {
        let src = "{{#list items as |item idx|}}{{item}}{{idx}}{{else}}{{yield}}{{/list}}";
        let block = BlockStatement {
            path: path(src, "list"),
            params: vec![path_expr(src, "items")],
            hash: hash(vec![]),
            program: Block {
                body: vec![
                    mustache_node(src, "{{item}}", path_expr(src, "item"), vec![], hash(vec![])),
                    mustache_node(src, "{{idx}}", path_expr(src, "idx"), vec![], hash(vec![])),
                ],
                block_params: vec!["item".to_string(), "idx".to_string()],
                chained: false,
                loc: SourceSpan::default(),
            },
            inverse: Some(Block {
                body: vec![mustache_node(
                    src,
                    "{{yield}}",
                    path_expr(src, "yield"),
                    vec![],
                    hash(vec![]),
                )],
                block_params: vec![],
                chained: false,
                loc: span(src, "{{else}}{{yield}}"),
            }),
            loc: span(src, src),
        };
        let result = transform(src, vec![ContentNode::Block(block)]);
        assert_parses(&result.result.expect("emits code").code);
    }
}
