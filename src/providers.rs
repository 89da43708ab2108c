//! Static catalog of SPF `include:` providers.
//!
//! Maps the base domain of an include target to a provider name and a
//! category. The table is data, not logic: extend it freely, lookups go
//! through the lazily-built index.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// One catalog entry, keyed by the registrable base domain of the include
/// target (last two dot-labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub domain: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

pub const CATEGORY_UNKNOWN: &str = "unknown";

#[rustfmt::skip]
static PROVIDER_CATALOG: &[Provider] = &[
    // Email workspaces
    Provider { domain: "google.com",            name: "Google Workspace",        category: "Email Workspaces" },
    Provider { domain: "googlemail.com",        name: "Google Workspace",        category: "Email Workspaces" },
    Provider { domain: "outlook.com",           name: "Microsoft 365",           category: "Email Workspaces" },
    Provider { domain: "office365.com",         name: "Microsoft 365",           category: "Email Workspaces" },
    Provider { domain: "zoho.com",              name: "Zoho Mail",               category: "Email Workspaces" },
    Provider { domain: "zoho.eu",               name: "Zoho Mail",               category: "Email Workspaces" },
    Provider { domain: "fastmail.com",          name: "Fastmail",                category: "Email Workspaces" },
    Provider { domain: "messagingengine.com",   name: "Fastmail",                category: "Email Workspaces" },
    Provider { domain: "protonmail.ch",         name: "Proton Mail",             category: "Email Workspaces" },
    Provider { domain: "migadu.com",            name: "Migadu",                  category: "Email Workspaces" },
    Provider { domain: "yandex.net",            name: "Yandex 360",              category: "Email Workspaces" },
    Provider { domain: "mail.ru",               name: "Mail.ru",                 category: "Email Workspaces" },
    Provider { domain: "icloud.com",            name: "iCloud Mail",             category: "Email Workspaces" },
    Provider { domain: "mxroute.com",           name: "MXroute",                 category: "Email Workspaces" },

    // Transactional email
    Provider { domain: "sendgrid.net",          name: "SendGrid",                category: "Transactional Email" },
    Provider { domain: "mailgun.org",           name: "Mailgun",                 category: "Transactional Email" },
    Provider { domain: "mailgun.com",           name: "Mailgun",                 category: "Transactional Email" },
    Provider { domain: "amazonses.com",         name: "Amazon SES",              category: "Transactional Email" },
    Provider { domain: "postmarkapp.com",       name: "Postmark",                category: "Transactional Email" },
    Provider { domain: "mtasv.net",             name: "Postmark",                category: "Transactional Email" },
    Provider { domain: "sparkpostmail.com",     name: "SparkPost",               category: "Transactional Email" },
    Provider { domain: "smtp.com",              name: "SMTP.com",                category: "Transactional Email" },
    Provider { domain: "mandrillapp.com",       name: "Mandrill",                category: "Transactional Email" },
    Provider { domain: "mailjet.com",           name: "Mailjet",                 category: "Transactional Email" },
    Provider { domain: "sendinblue.com",        name: "Brevo",                   category: "Transactional Email" },
    Provider { domain: "brevo.com",             name: "Brevo",                   category: "Transactional Email" },
    Provider { domain: "smtp2go.com",           name: "SMTP2GO",                 category: "Transactional Email" },
    Provider { domain: "socketlabs.com",        name: "SocketLabs",              category: "Transactional Email" },
    Provider { domain: "elasticemail.com",      name: "Elastic Email",           category: "Transactional Email" },
    Provider { domain: "resend.com",            name: "Resend",                  category: "Transactional Email" },

    // Marketing platforms
    Provider { domain: "mailchimp.com",         name: "Mailchimp",               category: "Marketing" },
    Provider { domain: "mcsv.net",              name: "Mailchimp",               category: "Marketing" },
    Provider { domain: "rsgsv.net",             name: "Mailchimp",               category: "Marketing" },
    Provider { domain: "hubspot.com",           name: "HubSpot",                 category: "Marketing" },
    Provider { domain: "hubspotemail.net",      name: "HubSpot",                 category: "Marketing" },
    Provider { domain: "exacttarget.com",       name: "Salesforce Marketing Cloud", category: "Marketing" },
    Provider { domain: "salesforce.com",        name: "Salesforce",              category: "Marketing" },
    Provider { domain: "pardot.com",            name: "Pardot",                  category: "Marketing" },
    Provider { domain: "klaviyo.com",           name: "Klaviyo",                 category: "Marketing" },
    Provider { domain: "braze.com",             name: "Braze",                   category: "Marketing" },
    Provider { domain: "sparkpostelite.com",    name: "Braze",                   category: "Marketing" },
    Provider { domain: "constantcontact.com",   name: "Constant Contact",        category: "Marketing" },
    Provider { domain: "aweber.com",            name: "AWeber",                  category: "Marketing" },
    Provider { domain: "getresponse.com",       name: "GetResponse",             category: "Marketing" },
    Provider { domain: "convertkit.com",        name: "ConvertKit",              category: "Marketing" },
    Provider { domain: "activecampaign.com",    name: "ActiveCampaign",          category: "Marketing" },
    Provider { domain: "emsend.com",            name: "ActiveCampaign",          category: "Marketing" },
    Provider { domain: "campaignmonitor.com",   name: "Campaign Monitor",        category: "Marketing" },
    Provider { domain: "cmail19.com",           name: "Campaign Monitor",        category: "Marketing" },
    Provider { domain: "mailerlite.com",        name: "MailerLite",              category: "Marketing" },
    Provider { domain: "drip.com",              name: "Drip",                    category: "Marketing" },
    Provider { domain: "iterable.com",          name: "Iterable",                category: "Marketing" },
    Provider { domain: "customer.io",           name: "Customer.io",             category: "Marketing" },

    // Email security gateways
    Provider { domain: "pphosted.com",          name: "Proofpoint",              category: "Email Security" },
    Provider { domain: "proofpoint.com",        name: "Proofpoint",              category: "Email Security" },
    Provider { domain: "mimecast.com",          name: "Mimecast",                category: "Email Security" },
    Provider { domain: "mimecast.org",          name: "Mimecast",                category: "Email Security" },
    Provider { domain: "barracudanetworks.com", name: "Barracuda",               category: "Email Security" },
    Provider { domain: "cisco.com",             name: "Cisco Secure Email",      category: "Email Security" },
    Provider { domain: "iphmx.com",             name: "Cisco Secure Email",      category: "Email Security" },
    Provider { domain: "trendmicro.com",        name: "Trend Micro",             category: "Email Security" },
    Provider { domain: "trustwave.com",         name: "Trustwave",               category: "Email Security" },
    Provider { domain: "sophos.com",            name: "Sophos",                  category: "Email Security" },
    Provider { domain: "mailanyone.net",        name: "Fortra",                  category: "Email Security" },
    Provider { domain: "spamh.com",             name: "SpamHero",                category: "Email Security" },

    // Support and CRM
    Provider { domain: "zendesk.com",           name: "Zendesk",                 category: "Support & CRM" },
    Provider { domain: "freshdesk.com",         name: "Freshdesk",               category: "Support & CRM" },
    Provider { domain: "freshemail.io",         name: "Freshworks",              category: "Support & CRM" },
    Provider { domain: "intercom.io",           name: "Intercom",                category: "Support & CRM" },
    Provider { domain: "helpscout.net",         name: "Help Scout",              category: "Support & CRM" },
    Provider { domain: "front.com",             name: "Front",                   category: "Support & CRM" },
    Provider { domain: "gorgias.com",           name: "Gorgias",                 category: "Support & CRM" },
    Provider { domain: "dynect.net",            name: "Oracle Dyn",              category: "Support & CRM" },

    // Hosting and infrastructure
    Provider { domain: "ovh.com",               name: "OVHcloud",                category: "Hosting & Infrastructure" },
    Provider { domain: "godaddy.com",           name: "GoDaddy",                 category: "Hosting & Infrastructure" },
    Provider { domain: "secureserver.net",      name: "GoDaddy",                 category: "Hosting & Infrastructure" },
    Provider { domain: "cloudflare.com",        name: "Cloudflare",              category: "Hosting & Infrastructure" },
    Provider { domain: "hetzner.com",           name: "Hetzner",                 category: "Hosting & Infrastructure" },
    Provider { domain: "ionos.com",             name: "IONOS",                   category: "Hosting & Infrastructure" },
    Provider { domain: "1and1.com",             name: "IONOS",                   category: "Hosting & Infrastructure" },
    Provider { domain: "bluehost.com",          name: "Bluehost",                category: "Hosting & Infrastructure" },
    Provider { domain: "dreamhost.com",         name: "DreamHost",               category: "Hosting & Infrastructure" },
    Provider { domain: "hostgator.com",         name: "HostGator",               category: "Hosting & Infrastructure" },
    Provider { domain: "websitewelcome.com",    name: "HostGator",               category: "Hosting & Infrastructure" },
    Provider { domain: "squarespace.com",       name: "Squarespace",             category: "Hosting & Infrastructure" },
    Provider { domain: "wixdns.net",            name: "Wix",                     category: "Hosting & Infrastructure" },
    Provider { domain: "wpengine.com",          name: "WP Engine",               category: "Hosting & Infrastructure" },
    Provider { domain: "registrar-servers.com", name: "Namecheap",               category: "Hosting & Infrastructure" },
    Provider { domain: "privateemail.com",      name: "Namecheap Private Email", category: "Hosting & Infrastructure" },

    // Payments and commerce
    Provider { domain: "stripe.com",            name: "Stripe",                  category: "Payments & Commerce" },
    Provider { domain: "shopify.com",           name: "Shopify",                 category: "Payments & Commerce" },
    Provider { domain: "shopifyemail.com",      name: "Shopify",                 category: "Payments & Commerce" },
    Provider { domain: "paypal.com",            name: "PayPal",                  category: "Payments & Commerce" },
    Provider { domain: "squareup.com",          name: "Square",                  category: "Payments & Commerce" },
];

static PROVIDER_INDEX: Lazy<HashMap<&'static str, &'static Provider>> = Lazy::new(|| {
    PROVIDER_CATALOG
        .iter()
        .map(|provider| (provider.domain, provider))
        .collect()
});

/// Look up a provider by the base domain of an include target.
pub fn lookup(base_domain: &str) -> Option<&'static Provider> {
    PROVIDER_INDEX.get(base_domain).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_is_an_email_workspace() {
        let p = lookup("google.com").expect("google.com in catalog");
        assert_eq!(p.name, "Google Workspace");
        assert_eq!(p.category, "Email Workspaces");
    }

    #[test]
    fn unknown_domain_misses() {
        assert!(lookup("definitely-not-a-provider.example").is_none());
    }

    #[test]
    fn index_covers_whole_catalog() {
        // Duplicate keys would silently shadow entries.
        let distinct: std::collections::HashSet<_> =
            PROVIDER_CATALOG.iter().map(|p| p.domain).collect();
        assert_eq!(distinct.len(), PROVIDER_CATALOG.len());
    }
}
