#[cfg(test)]
mod tests {
    use crate::ast::SourceSpan;
    use crate::mapping::MappedText;
    use crate::test_support::*;
    use crate::transform::TransformOptions;

    #[test]
    fn builder_records_mappings_in_emission_order() {
        let mut out = MappedText::new(0);
        out.emit("ab");
        out.emit_mapped("cd", SourceSpan::new(5, 7));
        out.emit("-");
        out.emit_mapped("e", SourceSpan::new(1, 2));
        let (text, map) = out.finish();
        assert_eq!(text, "abcd-e");
        let entries = map.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].emitted, SourceSpan::new(2, 4));
        assert_eq!(entries[0].original, SourceSpan::new(5, 7));
        assert_eq!(entries[1].emitted, SourceSpan::new(5, 6));
        assert_eq!(entries[1].original, SourceSpan::new(1, 2));
    }

    #[test]
    fn lookups_translate_offsets_in_both_directions() {
        let mut out = MappedText::new(0);
        out.emit("ab");
        out.emit_mapped("cd", SourceSpan::new(5, 7));
        out.emit("-");
        out.emit_mapped("e", SourceSpan::new(1, 2));
        let (_, map) = out.finish();
        assert_eq!(map.original_to_emitted(5), Some(2));
        assert_eq!(map.original_to_emitted(6), Some(3));
        assert_eq!(map.original_to_emitted(1), Some(5));
        assert_eq!(map.original_to_emitted(0), None);
        assert_eq!(map.original_to_emitted(7), None);
        assert_eq!(map.emitted_to_original(2), Some(5));
        assert_eq!(map.emitted_to_original(3), Some(6));
        assert_eq!(map.emitted_to_original(5), Some(1));
        assert_eq!(map.emitted_to_original(0), None);
        assert_eq!(map.emitted_to_original(4), None);
    }

    #[test]
    fn indentation_prefixes_each_line() {
        let mut out = MappedText::new(0);
        out.push_indent();
        out.emit_line("x");
        out.push_indent();
        out.emit_line("y");
        out.pop_indent();
        out.emit_line("z");
        let (text, _) = out.finish();
        assert_eq!(text, "  x\n    y\n  z\n");
    }

    #[test]
    fn transform_covers_identifier_tokens() {
        let src = "{{this.name}}";
        let result = transform(
            src,
            vec![mustache_node(
                src,
                src,
                path_expr(src, "this.name"),
                vec![],
                hash(vec![]),
            )],
        );
        let module = result.result.expect("emits code");
        let ranges = &module.ranges;

        let head = ranges
            .entries()
            .iter()
            .find(|e| e.original == span(src, "this"))
            .expect("head is mapped");
        assert_eq!(
            &module.code[head.emitted.start as usize..head.emitted.end as usize],
            "Γ.this"
        );

        let tail = ranges
            .entries()
            .iter()
            .find(|e| e.original == span(src, "name"))
            .expect("tail segment is mapped");
        assert_eq!(
            &module.code[tail.emitted.start as usize..tail.emitted.end as usize],
            "name"
        );
    }

    #[test]
    fn entries_stay_within_bounds() {
        let src = r#"{{greet "hi"}}"#;
        let result = transform(
            src,
            vec![mustache_node(
                src,
                src,
                path_expr(src, "greet"),
                vec![string_lit(src, "hi")],
                hash(vec![]),
            )],
        );
        let module = result.result.expect("emits code");
        for entry in module.ranges.entries() {
            assert!(entry.emitted.end as usize <= module.code.len());
            assert!(entry.original.end as usize <= src.len());
        }
    }

    #[test]
    fn emitted_spans_are_disjoint_and_ordered() {
        let src = r#"{{greet "hi"}}"#;
        let result = transform(
            src,
            vec![mustache_node(
                src,
                src,
                path_expr(src, "greet"),
                vec![string_lit(src, "hi")],
                hash(vec![]),
            )],
        );
        let module = result.result.expect("emits code");
        for pair in module.ranges.entries().windows(2) {
            assert!(pair[0].emitted.end <= pair[1].emitted.start);
        }
    }

    #[test]
    fn bidirectional_lookups_agree() {
        let src = "{{this.name}}";
        let result = transform(
            src,
            vec![mustache_node(
                src,
                src,
                path_expr(src, "this.name"),
                vec![],
                hash(vec![]),
            )],
        );
        let module = result.result.expect("emits code");
        for entry in module.ranges.entries() {
            assert_eq!(
                module.ranges.original_to_emitted(entry.original.start),
                Some(entry.emitted.start)
            );
            assert_eq!(
                module.ranges.emitted_to_original(entry.emitted.start),
                Some(entry.original.start)
            );
        }
    }

    #[test]
    fn embedded_start_shifts_every_origin() {
        let src = "{{this.name}}";
        let options = TransformOptions {
            embedded_start: Some(100),
            ..TransformOptions::default()
        };
        let result = transform_with(
            src,
            vec![mustache_node(
                src,
                src,
                path_expr(src, "this.name"),
                vec![],
                hash(vec![]),
            )],
            &options,
        );
        let module = result.result.expect("emits code");
        for entry in module.ranges.entries() {
            assert!(entry.original.start >= 100);
        }
        let head_start = 100 + span(src, "this").start;
        assert!(module.ranges.original_to_emitted(head_start).is_some());
        assert!(module.ranges.original_to_emitted(0).is_none());
    }

    #[test]
    fn scaffolding_offsets_are_unmapped() {
        let src = "{{this.name}}";
        let result = transform(
            src,
            vec![mustache_node(
                src,
                src,
                path_expr(src, "this.name"),
                vec![],
                hash(vec![]),
            )],
        );
        let module = result.result.expect("emits code");
        // The leading "{{" of the mustache never reaches the output.
        assert_eq!(module.ranges.original_to_emitted(0), None);
        // Offset zero of the output is frame scaffolding.
        assert_eq!(module.ranges.emitted_to_original(0), None);
    }
}
