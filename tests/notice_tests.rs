//! Integration tests for the notice model: parameter parsing, numbering and
//! write-back through the page tree.

use copied_notice_editor::notice::codec;
use copied_notice_editor::notice::{
    CopiedTemplate, NoticeEvent, Row, RowField, RowFields, RowIdSequence,
};
use copied_notice_editor::page::transclusion::DATA_MW;
use copied_notice_editor::page::{
    NodeId, PageNode, PageTree, ParamMap, ParamValue, TemplateCall, TransclusionData,
};
use std::sync::{Arc, Mutex};

fn params(pairs: &[(&str, &str)]) -> ParamMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), ParamValue::new(*v)))
        .collect()
}

/// Helper to build a page holding one `{{copied}}` call with `pairs`.
fn setup_notice(pairs: &[(&str, &str)]) -> (PageTree, NodeId, CopiedTemplate, RowIdSequence) {
    let mut call = TemplateCall::new("copied", "./Template:Copied", 0);
    call.params = params(pairs);
    let page = PageNode::element("html").with_child(
        PageNode::element("body").with_child(
            PageNode::element("span")
                .with_attr("about", "#mwt9")
                .with_attr("typeof", "mw:Transclusion")
                .with_attr(DATA_MW, TransclusionData::single(call).to_json().unwrap()),
        ),
    );
    let tree = PageTree::from_node(&page);
    let span = tree
        .select_first(|t, id| t.tag(id) == Some("span"))
        .expect("span present");
    let mut ids = RowIdSequence::new();
    let notice = CopiedTemplate::bind(&tree, span, 0, &mut ids).expect("notice binds");
    (tree, span, notice, ids)
}

fn field_values(notice: &CopiedTemplate, field: RowField) -> Vec<Option<String>> {
    notice
        .rows()
        .iter()
        .map(|row| row.get(field).map(str::to_string))
        .collect()
}

mod parse_tests {
    use super::*;

    #[test]
    fn single_unnumbered_row() {
        let (tree, _, notice, _) = setup_notice(&[("from", "X"), ("date", "2020-01-01")]);

        assert_eq!(notice.rows().len(), 1);
        let row = &notice.rows()[0];
        assert_eq!(row.get(RowField::From), Some("X"));
        assert_eq!(row.get(RowField::Date), Some("2020-01-01"));
        for field in RowField::ALL {
            if field != RowField::From && field != RowField::Date {
                assert_eq!(row.get(field), None, "{} should be absent", field);
            }
        }

        let text = notice.to_text(&tree).unwrap();
        assert_eq!(text, "{{copied| from = X\n| date = 2020-01-01\n}}");
    }

    #[test]
    fn second_row_uses_suffix_two() {
        let (_, _, notice, _) = setup_notice(&[("from", "X"), ("from2", "Y")]);
        assert_eq!(
            field_values(&notice, RowField::From),
            vec![Some("X".to_string()), Some("Y".to_string())]
        );
    }

    #[test]
    fn suffix_one_is_alias_for_bare() {
        let (_, _, notice, _) = setup_notice(&[("from1", "X"), ("to1", "Z"), ("from2", "Y")]);
        assert_eq!(notice.rows().len(), 2);
        assert_eq!(notice.rows()[0].get(RowField::To), Some("Z"));

        // Bare name wins when both are present; suffix 1 still fills gaps.
        let (_, _, notice, _) = setup_notice(&[("from", "bare"), ("from1", "one"), ("to1", "T")]);
        assert_eq!(notice.rows().len(), 1);
        assert_eq!(notice.rows()[0].get(RowField::From), Some("bare"));
        assert_eq!(notice.rows()[0].get(RowField::To), Some("T"));
    }

    #[test]
    fn numbering_stops_at_first_gap() {
        let (_, _, notice, _) = setup_notice(&[("from", "A"), ("from2", "B"), ("from4", "D")]);
        assert_eq!(notice.rows().len(), 2);
    }

    #[test]
    fn unknown_parameters_and_flags() {
        let (tree, _, mut notice, _) = setup_notice(&[
            ("from", "A"),
            ("collapse", " yes "),
            ("small", "   "),
            ("colour", "red"),
        ]);
        assert!(notice.collapsed());
        assert!(!notice.small());

        let mut tree = tree;
        notice.save(&mut tree).unwrap();
        let call = notice.read_call(&tree).unwrap();
        assert!(call.params.get("colour").is_none());
        assert_eq!(call.params.get("collapse").unwrap().wt, "yes");
    }

    #[test]
    fn blank_values_are_absent() {
        let (_, _, notice, _) = setup_notice(&[("from", "A"), ("to", "  "), ("date", "")]);
        assert_eq!(notice.rows()[0].get(RowField::To), None);
        assert_eq!(notice.rows()[0].get(RowField::Date), None);
    }
}

mod save_tests {
    use super::*;

    #[test]
    fn save_then_parse_reproduces_rows() {
        let (mut tree, _, mut notice, mut ids) = setup_notice(&[("from", "A"), ("to", "B")]);
        for (from, date) in [("C", "2021-01-01"), ("D", ""), ("E", "5 May 2022")] {
            let fields = RowFields::new()
                .with(RowField::From, from)
                .with(RowField::Date, date);
            notice
                .add_row(&mut tree, Row::new(fields, "elsewhere", &mut ids))
                .unwrap();
        }
        let second = notice.rows()[1].id().clone();
        notice.delete_row(&mut tree, &second).unwrap();

        let before: Vec<RowFields> = notice.rows().iter().map(|r| r.fields().clone()).collect();
        notice.parse(&tree, &mut ids).unwrap();
        let after: Vec<RowFields> = notice.rows().iter().map(|r| r.fields().clone()).collect();
        assert_eq!(before, after);
        assert_eq!(
            field_values(&notice, RowField::From),
            vec![Some("A".to_string()), Some("D".to_string()), Some("E".to_string())]
        );
    }

    #[test]
    fn numbering_law() {
        let rows: Vec<RowFields> = (0..5)
            .map(|i| RowFields::new().with(RowField::From, format!("Page {}", i)))
            .collect();
        let encoded = codec::encode(false, false, rows.iter());
        let keys: Vec<&str> = encoded.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["from", "from2", "from3", "from4", "from5"]);

        let decoded = codec::decode(&encoded);
        assert_eq!(decoded.rows, rows);
    }

    #[test]
    fn idempotent_delete_sends_nothing() {
        let (mut tree, _, mut notice, mut ids) = setup_notice(&[("from", "A")]);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        notice.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let stranger = Row::new(RowFields::new().with(RowField::From, "Z"), "other", &mut ids);
        assert!(notice.delete_row(&mut tree, stranger.id()).unwrap().is_none());
        assert_eq!(notice.rows().len(), 1);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn destroy_notifies_then_removes_node() {
        let (mut tree, span, mut notice, _) = setup_notice(&[("from", "A")]);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        notice.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        notice.destroy(&mut tree).unwrap();
        assert_eq!(*events.lock().unwrap(), vec![NoticeEvent::Destroyed]);
        assert!(!tree.contains(span));
    }

    #[test]
    fn attribution_summary_for_row() {
        let (_, _, notice, _) = setup_notice(&[
            ("from", "Source"),
            ("from_oldid", "100"),
            ("to_diff", "200"),
        ]);
        let summary = notice.rows()[0].attribution_summary();
        assert!(!summary.lacking);
        assert_eq!(
            summary.text,
            "Attribution: Content partially copied from [[Source]] as of revision \
             [[Special:Diff/100|100]] with [[Special:Diff/200|this edit]]; refer to that \
             page's [[Special:PageHistory/Source|edit history]] for additional attribution."
        );
    }
}
