//! RDAP registration lookups (RFC 7483, jCard per RFC 7095).
//!
//! The IANA bootstrap registry maps TLDs to RDAP base URLs; it is fetched
//! once per process and cached behind a `OnceCell`, so concurrent probes
//! single-flight the initial download. Lookups GET `<base>domain/<fqdn>`,
//! retry transient failures with linear backoff and parse the JSON answer
//! into the same `WhoisRecord` shape the port-43 path produces.
//!
//! jCard arrays are heterogeneously typed (strings, objects and arrays mixed
//! per property), so the contact extraction walks `[name, params, type,
//! value]` quads defensively instead of deserializing into fixed structs.

use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::errors::{Result, ScanError};
use crate::record::{Contact, ContactField, RegistrationSourceKind, WhoisRecord};
use crate::retry::{RetryConfig, retry_async};

pub const BOOTSTRAP_URL: &str = "https://data.iana.org/rdap/dns.json";
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const NOT_FOUND_MESSAGE: &str = "Domain not found in RDAP";

/// IANA bootstrap registry: each service entry pairs a TLD list with the
/// RDAP base URLs serving them.
#[derive(Debug, Clone, Deserialize)]
pub struct RdapBootstrap {
    pub services: Vec<(Vec<String>, Vec<String>)>,
}

impl RdapBootstrap {
    /// Base URL of the first service entry covering `tld`.
    pub fn server_base(&self, tld: &str) -> Option<&str> {
        self.services
            .iter()
            .find(|(tlds, _)| tlds.iter().any(|t| t.eq_ignore_ascii_case(tld)))
            .and_then(|(_, servers)| servers.first())
            .map(|s| s.as_str())
    }
}

static BOOTSTRAP: OnceCell<RdapBootstrap> = OnceCell::const_new();

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .build()
        .expect("reqwest client construction cannot fail with static options")
});

/// Fetch outcome classification used by the retry policy.
enum FetchError {
    Transient(String),
    Fatal(String),
}

/// Cached bootstrap registry, downloading it on first use.
async fn bootstrap() -> Result<&'static RdapBootstrap> {
    BOOTSTRAP
        .get_or_try_init(|| async {
            let response = HTTP_CLIENT
                .get(BOOTSTRAP_URL)
                .send()
                .await
                .map_err(|e| ScanError::http(BOOTSTRAP_URL, e.to_string()))?;
            response
                .json::<RdapBootstrap>()
                .await
                .map_err(|e| ScanError::parse("rdap bootstrap", BOOTSTRAP_URL, e.to_string()))
        })
        .await
}

/// Look up `fqdn` against its TLD's RDAP service.
pub async fn lookup(fqdn: &str) -> Result<WhoisRecord> {
    let tld = fqdn
        .rsplit('.')
        .next()
        .unwrap_or(fqdn)
        .to_ascii_lowercase();

    let base = bootstrap()
        .await?
        .server_base(&tld)
        .ok_or_else(|| ScanError::rdap(fqdn, format!("no RDAP service for TLD: {tld}")))?;

    let url = if base.ends_with('/') {
        format!("{base}domain/{fqdn}")
    } else {
        format!("{base}/domain/{fqdn}")
    };

    let config = RetryConfig::default();
    let outcome = retry_async(
        &config,
        |e: &FetchError| matches!(e, FetchError::Transient(_)),
        || fetch_once(&url),
    )
    .await;

    match outcome {
        Ok((status, body)) if status == 200 => parse_rdap(fqdn, &body),
        Ok((status, _)) if status == 404 => Err(ScanError::rdap(fqdn, NOT_FOUND_MESSAGE)),
        Ok((status, _)) => Err(ScanError::rdap(fqdn, format!("unexpected status {status}"))),
        Err(FetchError::Transient(reason)) | Err(FetchError::Fatal(reason)) => {
            Err(ScanError::rdap(fqdn, reason))
        }
    }
}

/// One GET; transport errors and 429/5xx answers are transient.
async fn fetch_once(url: &str) -> std::result::Result<(u16, String), FetchError> {
    let response = HTTP_CLIENT
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transient(e.to_string()))?;

    let status = response.status();
    if status.as_u16() == 429 || status.is_server_error() {
        return Err(FetchError::Transient(format!("status {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Fatal(format!("body read failed: {e}")))?;
    Ok((status.as_u16(), body))
}

/// Parse an RDAP domain object into a `WhoisRecord`.
pub fn parse_rdap(fqdn: &str, body: &str) -> Result<WhoisRecord> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| ScanError::parse("rdap response", fqdn, e.to_string()))?;

    let entities = json
        .get("entities")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let registrar = find_entity_with_role(&entities, "registrar").and_then(registrar_name);

    let events = json.get("events").and_then(Value::as_array);
    let creation_date = events.and_then(|e| event_date(e, "registration"));
    let expiration_date = events.and_then(|e| event_date(e, "expiration"));
    let updated_date = events.and_then(|e| event_date(e, "last changed"));

    let status = json.get("status").and_then(Value::as_array).map(|values| {
        values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect::<Vec<_>>()
    });
    let status = status.filter(|s| !s.is_empty());

    let nameservers = json
        .get("nameservers")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|ns| ns.get("ldhName").and_then(Value::as_str))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|ns| !ns.is_empty());

    Ok(WhoisRecord {
        domain: fqdn.to_string(),
        source: RegistrationSourceKind::Rdap,
        raw_data: body.to_string(),
        registered: true,
        registrar,
        creation_date,
        expiration_date,
        updated_date,
        status,
        nameservers,
        registrant: contact_for_role(&entities, "registrant"),
        admin_contact: contact_for_role(&entities, "administrative"),
        tech_contact: contact_for_role(&entities, "technical"),
        abuse_contact: contact_for_role(&entities, "abuse"),
    })
}

/// Find an entity carrying `role`, looking first at the top level and then
/// one level into each entity's nested entities (abuse contacts usually sit
/// inside the registrar entity).
fn find_entity_with_role<'a>(entities: &'a [Value], role: &str) -> Option<&'a Value> {
    if let Some(entity) = entities.iter().find(|e| has_role(e, role)) {
        return Some(entity);
    }
    entities
        .iter()
        .filter_map(|e| e.get("entities").and_then(Value::as_array))
        .flat_map(|nested| nested.iter())
        .find(|e| has_role(e, role))
}

fn has_role(entity: &Value, role: &str) -> bool {
    entity
        .get("roles")
        .and_then(Value::as_array)
        .is_some_and(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
}

fn contact_for_role(entities: &[Value], role: &str) -> Option<ContactField> {
    find_entity_with_role(entities, role)
        .map(extract_contact)
        .map(ContactField::from_contact)
}

/// Registrar display name: first `fn` or `org` property with a string value.
fn registrar_name(entity: &Value) -> Option<String> {
    vcard_properties(entity)?.iter().find_map(|prop| {
        let name = property_name(prop)?;
        if name == "fn" || name == "org" {
            non_empty(property_value(prop)?.as_str()?)
        } else {
            None
        }
    })
}

/// First event whose action contains `action_fragment`.
fn event_date(events: &[Value], action_fragment: &str) -> Option<String> {
    events.iter().find_map(|event| {
        let action = event.get("eventAction")?.as_str()?;
        if action.contains(action_fragment) {
            non_empty(event.get("eventDate")?.as_str()?)
        } else {
            None
        }
    })
}

/// Walk an entity's jCard quads into a structured contact.
fn extract_contact(entity: &Value) -> Contact {
    let mut contact = Contact::default();
    let Some(properties) = vcard_properties(entity) else {
        return contact;
    };

    for prop in properties {
        let Some(name) = property_name(prop) else {
            continue;
        };
        match name {
            "fn" => {
                contact.name = contact
                    .name
                    .take()
                    .or_else(|| property_string(prop));
            }
            "org" => {
                contact.organization = contact
                    .organization
                    .take()
                    .or_else(|| property_string(prop));
            }
            "email" => {
                contact.email = contact.email.take().or_else(|| property_string(prop));
            }
            "tel" => {
                if tel_is_fax(prop) {
                    contact.fax = contact.fax.take().or_else(|| property_string(prop));
                } else {
                    contact.phone = contact.phone.take().or_else(|| property_string(prop));
                }
            }
            "adr" => {
                if let Some((address, country)) = extract_address(prop) {
                    contact.address = contact.address.take().or(address);
                    contact.country = contact.country.take().or(country);
                }
            }
            _ => {}
        }
    }

    contact
}

fn vcard_properties(entity: &Value) -> Option<&Vec<Value>> {
    entity
        .get("vcardArray")
        .and_then(Value::as_array)?
        .get(1)
        .and_then(Value::as_array)
}

fn property_name(prop: &Value) -> Option<&str> {
    prop.get(0).and_then(Value::as_str)
}

fn property_value(prop: &Value) -> Option<&Value> {
    prop.get(3)
}

fn property_string(prop: &Value) -> Option<String> {
    match property_value(prop)? {
        Value::String(s) => non_empty(s),
        // Some registries publish multi-valued properties as arrays.
        Value::Array(values) => values.iter().filter_map(Value::as_str).find_map(non_empty),
        _ => None,
    }
}

/// The `type` parameter of a tel property is a string or an array of
/// strings; either form may mark the number as a fax line.
fn tel_is_fax(prop: &Value) -> bool {
    let Some(kind) = prop.get(1).and_then(|params| params.get("type")) else {
        return false;
    };
    match kind {
        Value::String(s) => s.eq_ignore_ascii_case("fax"),
        Value::Array(values) => values
            .iter()
            .filter_map(Value::as_str)
            .any(|v| v.eq_ignore_ascii_case("fax")),
        _ => false,
    }
}

/// Flatten the 7-component adr value into a comma-joined address; component
/// index 6 is the country.
fn extract_address(prop: &Value) -> Option<(Option<String>, Option<String>)> {
    let components = property_value(prop)?.as_array()?;

    let mut parts = Vec::new();
    for component in components {
        match component {
            Value::String(s) if !s.trim().is_empty() => parts.push(s.trim().to_string()),
            Value::Array(values) => parts.extend(
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.trim().to_string()),
            ),
            _ => {}
        }
    }

    let address = if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    };
    let country = components.get(6).and_then(|c| match c {
        Value::String(s) => non_empty(s),
        Value::Array(values) => values.iter().filter_map(Value::as_str).find_map(non_empty),
        _ => None,
    });

    Some((address, country))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "objectClassName": "domain",
        "ldhName": "EXAMPLE.COM",
        "status": ["client transfer prohibited", "server delete prohibited"],
        "events": [
            {"eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z"},
            {"eventAction": "expiration", "eventDate": "2026-08-13T04:00:00Z"},
            {"eventAction": "last changed", "eventDate": "2025-08-14T07:01:44Z"}
        ],
        "nameservers": [
            {"ldhName": "A.IANA-SERVERS.NET"},
            {"ldhName": "B.IANA-SERVERS.NET"},
            {"ldhName": ""}
        ],
        "entities": [
            {
                "roles": ["registrar"],
                "vcardArray": ["vcard", [
                    ["version", {}, "text", "4.0"],
                    ["fn", {}, "text", "Example Registrar, Inc."]
                ]],
                "entities": [
                    {
                        "roles": ["abuse"],
                        "vcardArray": ["vcard", [
                            ["version", {}, "text", "4.0"],
                            ["fn", {}, "text", "Abuse Desk"],
                            ["email", {}, "text", "abuse@registrar.example"],
                            ["tel", {"type": ["voice"]}, "uri", "tel:+1.5555551212"],
                            ["tel", {"type": "fax"}, "uri", "tel:+1.5555551213"]
                        ]]
                    }
                ]
            },
            {
                "roles": ["registrant"],
                "vcardArray": ["vcard", [
                    ["version", {}, "text", "4.0"],
                    ["fn", {}, "text", ""],
                    ["email", {}, "text", "privacy@proxy.example"]
                ]]
            },
            {
                "roles": ["technical"],
                "vcardArray": ["vcard", [
                    ["version", {}, "text", "4.0"],
                    ["fn", {}, "text", "Ops Team"],
                    ["org", {}, "text", "Example Org"],
                    ["adr", {}, "text", ["", "", "123 Main St", "Springfield", "", "12345", "US"]]
                ]]
            }
        ]
    }"#;

    #[test]
    fn parses_full_domain_object() {
        let record = parse_rdap("example.com", FIXTURE).unwrap();

        assert!(record.registered);
        assert_eq!(record.source, RegistrationSourceKind::Rdap);
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar, Inc."));
        assert_eq!(record.creation_date.as_deref(), Some("1995-08-14T04:00:00Z"));
        assert_eq!(
            record.expiration_date.as_deref(),
            Some("2026-08-13T04:00:00Z")
        );
        assert_eq!(record.updated_date.as_deref(), Some("2025-08-14T07:01:44Z"));
        assert_eq!(
            record.status.as_deref(),
            Some(
                &[
                    "client transfer prohibited".to_string(),
                    "server delete prohibited".to_string()
                ][..]
            )
        );
        // Empty ldhName entries are filtered out.
        assert_eq!(
            record.nameservers.as_deref(),
            Some(&["A.IANA-SERVERS.NET".to_string(), "B.IANA-SERVERS.NET".to_string()][..])
        );
    }

    #[test]
    fn abuse_contact_found_in_nested_entities() {
        let record = parse_rdap("example.com", FIXTURE).unwrap();
        match record.abuse_contact {
            Some(ContactField::Details(contact)) => {
                assert_eq!(contact.name.as_deref(), Some("Abuse Desk"));
                assert_eq!(contact.email.as_deref(), Some("abuse@registrar.example"));
                assert_eq!(contact.phone.as_deref(), Some("tel:+1.5555551212"));
                assert_eq!(contact.fax.as_deref(), Some("tel:+1.5555551213"));
            }
            other => panic!("expected abuse contact details, got {other:?}"),
        }
    }

    #[test]
    fn empty_registrant_is_redacted() {
        let record = parse_rdap("example.com", FIXTURE).unwrap();
        assert_eq!(record.registrant, Some(ContactField::redacted()));
    }

    #[test]
    fn technical_contact_address_is_flattened() {
        let record = parse_rdap("example.com", FIXTURE).unwrap();
        match record.tech_contact {
            Some(ContactField::Details(contact)) => {
                assert_eq!(
                    contact.address.as_deref(),
                    Some("123 Main St, Springfield, 12345, US")
                );
                assert_eq!(contact.country.as_deref(), Some("US"));
                assert_eq!(contact.organization.as_deref(), Some("Example Org"));
            }
            other => panic!("expected tech contact details, got {other:?}"),
        }
    }

    #[test]
    fn missing_admin_contact_is_none() {
        let record = parse_rdap("example.com", FIXTURE).unwrap();
        assert_eq!(record.admin_contact, None);
    }

    #[test]
    fn bootstrap_picks_first_matching_service() {
        let bootstrap = RdapBootstrap {
            services: vec![
                (
                    vec!["com".into(), "net".into()],
                    vec!["https://rdap.verisign.com/com/v1/".into()],
                ),
                (vec!["org".into()], vec!["https://rdap.org.example/".into()]),
            ],
        };
        assert_eq!(
            bootstrap.server_base("com"),
            Some("https://rdap.verisign.com/com/v1/")
        );
        assert_eq!(
            bootstrap.server_base("ORG"),
            Some("https://rdap.org.example/")
        );
        assert_eq!(bootstrap.server_base("dev"), None);
    }

    #[test]
    fn bootstrap_deserializes_iana_shape() {
        let raw = r#"{
            "description": "RDAP bootstrap file for Domain Name System registrations",
            "publication": "2026-01-01T00:00:00Z",
            "services": [
                [["com", "net"], ["https://rdap.verisign.com/com/v1/"]]
            ],
            "version": "1.0"
        }"#;
        let bootstrap: RdapBootstrap = serde_json::from_str(raw).unwrap();
        assert_eq!(bootstrap.services.len(), 1);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let result = parse_rdap("example.com", "not json");
        assert!(matches!(result, Err(ScanError::Parse { .. })));
    }
}
