// Tests for request preprocessing and parsing.

use crate::request::*;
use crate::Error;

#[test]
fn test_clean_text() {
    assert_eq!(clean_text(b"<A/>\r\n"), "<A/>");
    assert_eq!(clean_text(b"<A\0/>\0\0"), "<A/>");
    assert_eq!(clean_text(b"  <A/> \n\0"), "  <A/>");
    assert_eq!(clean_text(b"<A N=\"\xff\"/>"), "<A N=\"\u{fffd}\"/>");
}

#[test]
fn test_xml_fragment() {
    assert_eq!(xml_fragment("<A/>"), "<A/>");
    assert_eq!(xml_fragment("\x00\x17garbage<A><B/></A>"), "<A><B/></A>");
    assert_eq!(xml_fragment("x<y<z"), "<y<z");
    assert_eq!(xml_fragment("not xml"), "not xml");
    assert_eq!(xml_fragment(""), "");
}

#[test]
fn test_parse_query() {
    let req = Request::parse(r#"<Request Action="QUERY" ID="7"><FB Name="*" Type="*"/></Request>"#)
        .unwrap();
    assert_eq!(req.root, "Request");
    assert_eq!(req.action.as_deref(), Some("QUERY"));
    assert_eq!(req.id.as_deref(), Some("7"));
    assert!(req.fb.unwrap().is_wildcard());

    // The first FB in document order wins, however deep it is.
    let req = Request::parse(concat!(
        r#"<?xml version="1.0"?>"#,
        r#"<Cmd ID="1" Action="QUERY"><Group><FB Name="E_CYCLE" Type="E_CYCLE"/></Group>"#,
        r#"<FB Name="other" Type="other"/></Cmd>"#,
    )).unwrap();
    let fb = req.fb.unwrap();
    assert_eq!(fb.name.as_deref(), Some("E_CYCLE"));
    assert_eq!(fb.fb_type.as_deref(), Some("E_CYCLE"));
    assert!(!fb.is_wildcard());
}

#[test]
fn test_parse_attributes() {
    let req = Request::parse(r#"<Request ID="a&amp;b"><FB Name="*"/></Request>"#).unwrap();
    assert_eq!(req.action, None);
    assert_eq!(req.id.as_deref(), Some("a&b"));
    let fb = req.fb.unwrap();
    assert_eq!(fb.fb_type, None);
    assert!(!fb.is_wildcard());

    // The root element itself is never taken as the FB.
    let req = Request::parse(r#"<FB Action="QUERY" Name="*" Type="*"/>"#).unwrap();
    assert_eq!(req.fb, None);
}

#[test]
fn test_parse_errors() {
    for text in ["not xml",
                 "",
                 "<Request>",
                 "<Request></Other>",
                 "<A/><B/>",
                 "<A/>trailing",
                 "</A>",
                 r#"<A ID="1" ID="2"/>"#,
                 r#"<A ID=1/>"#,
                 r#"<Request Action="READ" ID="1">&bogus;</Request>"#,
                 r#"<Request Action="READ" ID="1">a & b</Request>"#,
                 r#"<Request Action="READ" ID="1" x="a<b"/>"#] {
        assert!(Request::parse(text).is_err(), "{:?} should not parse", text);
    }
    assert!(matches!(Request::parse("not xml"), Err(Error::Document(_))));
    assert!(matches!(Request::parse(""), Err(Error::Document("no element found"))));
    assert!(matches!(Request::parse(r#"<A>x &bogus; y</A>"#), Err(Error::Xml(_))));

    // Escaped forms of the same characters are fine.
    let req = Request::parse(r#"<A ID="a&lt;b">a &amp; b &#60;</A>"#).unwrap();
    assert_eq!(req.id.as_deref(), Some("a<b"));
}
