//! ABR search payload decoding
//!
//! Walks the XML event stream and collects every `searchResultsRecord`,
//! wherever it sits in the document. Element names are matched on their
//! local part, so the ABR default namespace (or a prefixed one) makes no
//! difference.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{NameField, RawRegistryRecord};
use crate::error::RegistryError;

const RECORD_ELEMENT: &str = "searchResultsRecord";
const EXCEPTION_ELEMENT: &str = "exceptionDescription";

/// Decode an ABR name-search response into raw records
///
/// An empty body decodes to no records. A body that is not well-formed XML is
/// a [`RegistryError::Decode`]; an ABR `<exception>` payload with no records is
/// a [`RegistryError::Exception`].
pub fn decode_search_results(xml: &str) -> Result<Vec<RawRegistryRecord>, RegistryError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut record_depth: Option<usize> = None;
    let mut current = RawRegistryRecord::default();
    let mut records = Vec::new();
    let mut exception: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if record_depth.is_none() && name == RECORD_ELEMENT {
                    record_depth = Some(stack.len());
                    current = RawRegistryRecord::default();
                }
                stack.push(name);
            }
            Event::End(_) => {
                stack.pop();
                if record_depth == Some(stack.len()) {
                    records.push(std::mem::take(&mut current));
                    record_depth = None;
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                collect_text(&stack, record_depth, &mut current, &mut exception, &text);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = String::from_utf8_lossy(&raw);
                collect_text(&stack, record_depth, &mut current, &mut exception, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match exception {
        Some(description) if records.is_empty() => Err(RegistryError::Exception(description)),
        _ => Ok(records),
    }
}

fn collect_text(
    stack: &[String],
    record_depth: Option<usize>,
    record: &mut RawRegistryRecord,
    exception: &mut Option<String>,
    text: &str,
) {
    if let Some(depth) = record_depth {
        assign_field(record, &stack[depth + 1..], text);
    } else if stack.last().map(String::as_str) == Some(EXCEPTION_ELEMENT) {
        exception.get_or_insert_with(String::new).push_str(text);
    }
}

/// Route a text node to its record field by its path below the record element
fn assign_field(record: &mut RawRegistryRecord, path: &[String], text: &str) {
    let (group, leaf) = match path {
        [group, leaf] => (group.as_str(), leaf.as_str()),
        _ => return,
    };

    match (group, leaf) {
        ("ABN", "identifierValue") => record.identifier_value.push_str(text),
        ("ABN", "identifierStatus") => record.identifier_status.push_str(text),
        ("mainBusinessPhysicalAddress", "stateCode") => record.state_code.push_str(text),
        ("businessName", _) => assign_name(&mut record.business_name, leaf, text),
        ("mainName", _) => assign_name(&mut record.main_name, leaf, text),
        ("mainTradingName", _) => assign_name(&mut record.main_trading_name, leaf, text),
        _ => {}
    }
}

fn assign_name(field: &mut NameField, leaf: &str, text: &str) {
    match leaf {
        "organisationName" => field.organisation_name.push_str(text),
        "score" => field.score.get_or_insert_with(String::new).push_str(text),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ABRPayloadSearchResults xmlns="http://abr.business.gov.au/ABRXMLSearch/">
  <request>
    <nameSearchRequest><name>Apple</name></nameSearchRequest>
  </request>
  <response>
    <usageStatement>Usage statement</usageStatement>
    <searchResultsList>
      <numberOfRecords>2</numberOfRecords>
      <searchResultsRecord>
        <ABN>
          <identifierValue>50169260144</identifierValue>
          <identifierStatus>Active</identifierStatus>
        </ABN>
        <businessName>
          <organisationName>Apple Pty Ltd</organisationName>
          <score>95</score>
          <isCurrentIndicator>Y</isCurrentIndicator>
        </businessName>
        <mainBusinessPhysicalAddress>
          <stateCode>NSW</stateCode>
          <postcode>2000</postcode>
        </mainBusinessPhysicalAddress>
      </searchResultsRecord>
      <searchResultsRecord>
        <ABN>
          <identifierValue>12345678901</identifierValue>
          <identifierStatus>Cancelled</identifierStatus>
        </ABN>
        <mainName>
          <organisationName>Apples &amp; Pears Trading</organisationName>
        </mainName>
        <mainTradingName>
          <organisationName>A&amp;P</organisationName>
          <score>71</score>
        </mainTradingName>
        <mainBusinessPhysicalAddress>
          <stateCode>VIC</stateCode>
        </mainBusinessPhysicalAddress>
      </searchResultsRecord>
    </searchResultsList>
  </response>
</ABRPayloadSearchResults>"#;

    #[test]
    fn test_decode_records_in_order() {
        let records = decode_search_results(SEARCH_RESPONSE).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.identifier_value, "50169260144");
        assert_eq!(first.identifier_status, "Active");
        assert_eq!(first.state_code, "NSW");
        assert_eq!(first.business_name.organisation_name, "Apple Pty Ltd");
        assert_eq!(first.business_name.score.as_deref(), Some("95"));
        assert_eq!(first.main_trading_name, NameField::default());

        let second = &records[1];
        assert_eq!(second.identifier_status, "Cancelled");
        assert_eq!(second.main_name.organisation_name, "Apples & Pears Trading");
        assert_eq!(second.main_name.score, None);
        assert_eq!(second.main_trading_name.organisation_name, "A&P");
        assert_eq!(second.main_trading_name.score.as_deref(), Some("71"));
    }

    #[test]
    fn test_decode_prefixed_namespace() {
        let xml = r#"<abr:ABRPayloadSearchResults xmlns:abr="http://abr.business.gov.au/ABRXMLSearch/">
            <abr:searchResultsRecord>
              <abr:ABN><abr:identifierValue>50169260144</abr:identifierValue></abr:ABN>
            </abr:searchResultsRecord>
        </abr:ABRPayloadSearchResults>"#;
        let records = decode_search_results(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier_value, "50169260144");
    }

    #[test]
    fn test_decode_empty_body() {
        assert!(decode_search_results("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_no_results() {
        let xml = r#"<ABRPayloadSearchResults><response><searchResultsList>
            <numberOfRecords>0</numberOfRecords></searchResultsList></response></ABRPayloadSearchResults>"#;
        assert!(decode_search_results(xml).unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode_search_results("<response><searchResultsList></response>").unwrap_err();
        assert!(matches!(err, RegistryError::Decode(_)));
    }

    #[test]
    fn test_decode_exception_payload() {
        let xml = r#"<ABRPayloadSearchResults><response><exception>
            <exceptionDescription>The GUID entered is not recognised as a Registered Party</exceptionDescription>
            <exceptionCode>WEBSERVICES</exceptionCode>
        </exception></response></ABRPayloadSearchResults>"#;
        match decode_search_results(xml) {
            Err(RegistryError::Exception(description)) => {
                assert!(description.contains("GUID"));
            }
            other => panic!("expected exception, got {:?}", other),
        }
    }
}
