//! Shared fixtures for integration tests

/// A representative ProQuest export record with two contributors (orders
/// deliberately out of document order), subject terms, and an HTML body.
pub fn sample_record(goid: &str, publication: &str, body_html: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<RECORD>
  <GOID>{goid}</GOID>
  <Obj>
    <TitleAtt><Title>Markets Rally on Trade News</Title></TitleAtt>
    <NumericDate>2020-03-15</NumericDate>
    <ObjectTypes><mstar>News</mstar></ObjectTypes>
    <Terms>
      <GenSubjTerm><GenSubjValue>Stock exchanges</GenSubjValue></GenSubjTerm>
      <GenSubjTerm><GenSubjValue>International trade</GenSubjValue></GenSubjTerm>
    </Terms>
    <Contributors>
      <Contributor ContribOrder="2">
        <Author>
          <LastNameAtt><LastName>Doe</LastName></LastNameAtt>
          <FirstNameAtt><FirstName>Jane</FirstName></FirstNameAtt>
          <OriginalFormAtt><OriginalForm>Doe, Jane</OriginalForm></OriginalFormAtt>
        </Author>
      </Contributor>
      <Contributor ContribOrder="1">
        <Author>
          <LastNameAtt><LastName>Smith</LastName></LastNameAtt>
          <FirstNameAtt><FirstName>Amy</FirstName></FirstNameAtt>
          <OriginalFormAtt><OriginalForm>Smith, Amy</OriginalForm></OriginalFormAtt>
        </Author>
      </Contributor>
    </Contributors>
  </Obj>
  <DFS><PubFrosting><Title>{publication}</Title></PubFrosting></DFS>
  <TextInfo><Text HTMLContent="true">{body}</Text></TextInfo>
</RECORD>"#,
        goid = goid,
        publication = publication,
        body = escape_xml(body_html),
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
