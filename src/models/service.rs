pub const DEFAULT_PARTNER: &str = "Turjman Group";
pub const DEFAULT_SERVICE_LABEL: &str = "Legal Translation - MOFA";

/// Static catalog entry. Loaded at compile time, never user-writable.
#[derive(Debug, Clone, Copy)]
pub struct ServiceItem {
    pub id: &'static str,
    pub label: &'static str,
    pub service_label: &'static str,
    pub partner: Option<&'static str>,
    pub partner_id: &'static str,
    pub price_usdc: f64,
    pub default_trust_score: u64,
}

pub const SERVICES: &[ServiceItem] = &[
    ServiceItem {
        id: "mofa-legal-translation",
        label: "Legal Translation - MOFA",
        service_label: "Legal Translation - MOFA",
        partner: None,
        partner_id: "translator-023",
        price_usdc: 1.0,
        default_trust_score: 84,
    },
    ServiceItem {
        id: "mofaic-attestation",
        label: "Document Attestation - MOFAIC",
        service_label: "Document Attestation - MOFAIC",
        partner: None,
        partner_id: "attest-011",
        price_usdc: 1.25,
        default_trust_score: 82,
    },
    ServiceItem {
        id: "public-prosecution",
        label: "Public Prosecution Assistance",
        service_label: "Public Prosecution Assistance",
        partner: None,
        partner_id: "legal-008",
        price_usdc: 0.75,
        default_trust_score: 83,
    },
    ServiceItem {
        id: "business-setup-ded",
        label: "Business Setup - DED",
        service_label: "Business Setup - DED",
        partner: None,
        partner_id: "biz-021",
        price_usdc: 1.0,
        default_trust_score: 85,
    },
    ServiceItem {
        id: "golden-visa",
        label: "Golden Visa Application",
        service_label: "Golden Visa Application",
        partner: None,
        partner_id: "gov-007",
        price_usdc: 1.0,
        default_trust_score: 86,
    },
];

pub fn find_service(id: &str) -> Option<&'static ServiceItem> {
    SERVICES.iter().find(|service| service.id == id)
}
