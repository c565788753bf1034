use super::tokens;
use crate::{Key, Number, PullParser, Token, path};

#[test]
fn nested_empty_arrays_carry_their_keys() {
    assert_eq!(
        tokens("[[]]"),
        vec![
            Token::StartArray { key: None },
            Token::StartArray {
                key: Some(Key::Index(0))
            },
            Token::EndArray {
                key: Some(Key::Index(0))
            },
            Token::EndArray { key: None },
        ]
    );
}

#[test]
fn deep_object_chain_unwinds_with_parent_keys() {
    let toks = tokens(r#"{"a":{"b":{"c":111}}}"#);
    assert_eq!(
        toks,
        vec![
            Token::StartObject { key: None },
            Token::StartObject {
                key: Some(Key::from("a"))
            },
            Token::StartObject {
                key: Some(Key::from("b"))
            },
            Token::Number {
                key: Some(Key::from("c")),
                value: Number::Int(111)
            },
            Token::EndObject {
                key: Some(Key::from("b"))
            },
            Token::EndObject {
                key: Some(Key::from("a"))
            },
            Token::EndObject { key: None },
        ]
    );
}

#[test]
fn path_tracks_every_step() {
    let mut parser = PullParser::from_slice(br#"{"a":[10,{"b":true}],"c":null}"#);

    let expected: Vec<(Token, Vec<Key>, &str)> = vec![
        (Token::StartObject { key: None }, path![], ""),
        (
            Token::StartArray {
                key: Some(Key::from("a")),
            },
            path!["a"],
            "a",
        ),
        (
            Token::Number {
                key: Some(Key::Index(0)),
                value: Number::Int(10),
            },
            path!["a", 0],
            "a[0]",
        ),
        (
            Token::StartObject {
                key: Some(Key::Index(1)),
            },
            path!["a", 1],
            "a[1]",
        ),
        (
            Token::Bool {
                key: Some(Key::from("b")),
                value: true,
            },
            path!["a", 1, "b"],
            "a[1].b",
        ),
        (
            Token::EndObject {
                key: Some(Key::Index(1)),
            },
            path!["a", 1],
            "a[1]",
        ),
        (
            Token::EndArray {
                key: Some(Key::from("a")),
            },
            path!["a"],
            "a",
        ),
        (
            Token::Null {
                key: Some(Key::from("c")),
            },
            path!["c"],
            "c",
        ),
        (Token::EndObject { key: None }, path![], ""),
    ];

    for (token, path, dotted) in expected {
        assert_eq!(parser.read().unwrap(), Some(token));
        assert_eq!(parser.path(), path.as_slice());
        assert_eq!(parser.path_string(), dotted);
    }
    assert_eq!(parser.read().unwrap(), None);
}

/// Every scalar token's key equals the last path entry, and every array
/// element's index equals the number of siblings already emitted.
#[test]
fn scalar_keys_match_the_path_tail() {
    let mut parser =
        PullParser::from_slice(br#"{"xs":[1,2,3],"m":{"y":[true,null],"z":"s"}}"#);
    let mut sibling_counts: Vec<usize> = Vec::new();

    while let Some(token) = parser.read().unwrap() {
        match &token {
            Token::String { key, .. }
            | Token::Number { key, .. }
            | Token::Bool { key, .. }
            | Token::Null { key } => {
                assert_eq!(key.as_ref(), parser.path().last());
            }
            _ => {}
        }
        match &token {
            Token::StartArray { .. } => sibling_counts.push(0),
            Token::EndArray { .. } => {
                sibling_counts.pop();
            }
            Token::Number { key, .. } | Token::Bool { key, .. } | Token::Null { key }
                if matches!(key, Some(Key::Index(_))) =>
            {
                let emitted = sibling_counts.last_mut().unwrap();
                assert_eq!(key.as_ref().unwrap().as_index(), Some(*emitted));
                *emitted += 1;
            }
            _ => {}
        }
    }
}

#[test]
fn path_match_on_the_live_path() {
    let mut parser = PullParser::from_slice(br#"{"a":{"b":[0,{"c":1}]}}"#);
    let mut seen_c = false;
    while let Some(token) = parser.read().unwrap() {
        if matches!(token, Token::Number { .. }) && parser.path_match(&path!["b", "c"]) {
            seen_c = true;
            assert!(parser.path_match(&path!["a", "b", 1, "c"]));
            assert!(parser.path_match(&path![1]));
            assert!(!parser.path_match(&path!["c", "b"]));
            assert!(!parser.path_match(&path![0, "c"]));
        }
    }
    assert!(seen_c);
}

#[test]
fn root_scalars_have_empty_paths() {
    let mut parser = PullParser::from_slice(b"42");
    parser.read().unwrap();
    assert!(parser.path().is_empty());
    assert_eq!(parser.path_string(), "");
    assert!(parser.path_match(&path![]));
    assert!(!parser.path_match(&path!["a"]));
}

#[test]
fn sibling_scalars_replace_each_other_on_the_path() {
    let mut parser = PullParser::from_slice(br#"{"a":1,"b":2}"#);
    parser.read().unwrap();
    parser.read().unwrap();
    assert_eq!(parser.path(), path!["a"].as_slice());
    parser.read().unwrap();
    assert_eq!(parser.path(), path!["b"].as_slice());
    parser.read().unwrap();
    assert!(parser.path().is_empty());
}
