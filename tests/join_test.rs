use html_xliff::{extract, join, Assembler, Bundle};

const ROOT: &str = "<html xmlns:its=\"https://www.w3.org/2005/11/its\" lang=\"en\">";

/// Build a dictionary from source/target pairs, round-tripped through the
/// real XLIFF parser so lookups use the same canonical form as extraction.
fn bundle(units: &[(&str, &str)]) -> Bundle {
    let mut doc = String::from(
        "<xliff xmlns=\"urn:oasis:names:tc:xliff:document:1.2\" version=\"1.2\">\n\
         <file source-language=\"en\" target-language=\"fr\">\n<body>\n",
    );
    for (i, (source, target)) in units.iter().enumerate() {
        doc.push_str(&format!(
            "<trans-unit id=\"{}\"><source>{source}</source>\
             <target>{target}</target></trans-unit>\n",
            i + 1
        ));
    }
    doc.push_str("</body>\n</file>\n</xliff>\n");
    Bundle::parse(&doc, "test.xlf").expect("dictionary failed to parse")
}

#[test]
fn translations_replace_phrases_in_place() {
    let html = format!("{ROOT}\n<p>Hello</p>\n<p>World</p>\n</html>");
    let dict = bundle(&[("Hello", "Bonjour"), ("World", "Monde")]);

    let (out, report) = join(&html, &dict).expect("join failed");

    assert_eq!(out, format!("{ROOT}\n<p>Bonjour</p>\n<p>Monde</p>\n</html>"));
    assert_eq!(report.missing, 0);
}

#[test]
fn translators_can_reorder_inline_markup() {
    let html = format!("{ROOT}<p>Hello <b class=\"x\">world</b>!</p></html>");
    let dict = bundle(&[(
        "Hello <g id=\"1\">world</g>!",
        "<g id=\"1\">monde</g>, bonjour !",
    )]);

    let (out, _) = join(&html, &dict).expect("join failed");

    assert_eq!(
        out,
        format!("{ROOT}<p><b class=\"x\">monde</b>, bonjour !</p></html>")
    );
}

#[test]
fn pretty_printed_targets_do_not_leak_indentation() {
    let dictionary = "<xliff xmlns=\"urn:oasis:names:tc:xliff:document:1.2\" version=\"1.2\">\n\
                      <file source-language=\"en\" target-language=\"fr\">\n<body>\n\
                      <trans-unit id=\"1\">\n\
                      \t<source>Hello <g id=\"1\">world</g></source>\n\
                      \t<target>\n\t\tBonjour <g id=\"1\">monde</g>\n\t</target>\n\
                      </trans-unit>\n\
                      </body>\n</file>\n</xliff>\n";
    let dict = Bundle::parse(dictionary, "pretty.xlf").expect("dictionary failed to parse");
    let html = format!("{ROOT}<p>Hello <b>world</b></p></html>");

    let (out, report) = join(&html, &dict).expect("join failed");

    assert_eq!(report.missing, 0);
    assert_eq!(out, format!("{ROOT}<p>Bonjour <b>monde</b></p></html>"));
}

#[test]
fn void_markers_resolve_to_their_elements() {
    let html = format!("{ROOT}<p>line<br/>break</p></html>");
    let dict = bundle(&[("line<x id=\"1\"/>break", "ligne<x id=\"1\"/>coupure")]);

    let (out, _) = join(&html, &dict).expect("join failed");

    assert_eq!(out, format!("{ROOT}<p>ligne<br/>coupure</p></html>"));
}

#[test]
fn missing_translations_keep_the_source_text() {
    let html = format!("{ROOT}<p>Hello</p><p>New phrase</p></html>");
    let dict = bundle(&[("Hello", "Bonjour")]);

    let (out, report) = join(&html, &dict).expect("join failed");

    assert_eq!(report.missing, 1);
    assert!(out.contains("<p>Bonjour</p>"));
    assert!(out.contains("<p>New phrase</p>"));
}

#[test]
fn its_translate_attributes_are_stripped_from_the_output() {
    let html = "<html xmlns:its=\"https://www.w3.org/2005/11/its\" lang=\"en\" \
                its:translate=\"yes\"><p its:translate=\"no\">keep raw</p>\
                <p>Hello</p></html>";
    let dict = bundle(&[("Hello", "Bonjour")]);

    let (out, _) = join(html, &dict).expect("join failed");

    assert!(!out.contains("its:translate"));
    // The namespace declaration survives; only the translate flags go.
    assert!(out.contains("xmlns:its=\"https://www.w3.org/2005/11/its\""));
    assert!(out.contains("<p>keep raw</p>"));
    assert!(out.contains("<p>Bonjour</p>"));
}

#[test]
fn join_with_a_copy_dictionary_is_idempotent() {
    let html = format!(
        "{ROOT}\n<p>Alpha <b>beta</b></p>\n\
         <pre its:translate=\"no\">raw()</pre>\n<p>Gamma</p>\n</html>"
    );

    let report = extract(&html).expect("extraction failed");
    let mut assembler = Assembler::new();
    assembler.add_report(&report);
    let mut template = Vec::new();
    assembler
        .write_template(true, &mut template)
        .expect("template failed");
    let dict = Bundle::parse(&String::from_utf8(template).expect("utf8"), "copy.xlf")
        .expect("dictionary failed to parse");

    let (out, report) = join(&html, &dict).expect("join failed");

    assert_eq!(report.missing, 0);
    assert_eq!(
        out,
        format!("{ROOT}\n<p>Alpha <b>beta</b></p>\n<pre>raw()</pre>\n<p>Gamma</p>\n</html>")
    );
}

#[test]
fn scripts_and_cdata_pass_through_untouched() {
    let html = format!(
        "{ROOT}<script its:translate=\"no\"><![CDATA[if (a < b) run();]]></script>\
         <p>Hello</p></html>"
    );
    let dict = bundle(&[("Hello", "Bonjour")]);

    let (out, _) = join(&html, &dict).expect("join failed");

    assert!(out.contains("<script><![CDATA[if (a < b) run();]]></script>"));
    assert!(out.contains("<p>Bonjour</p>"));
}
