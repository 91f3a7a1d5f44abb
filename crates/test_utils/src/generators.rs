//! Randomized data generators built on `fake`

use fake::faker::lorem::en::Sentence;
use fake::Fake;

use core_kernel::CustomerId;
use domain_kyc::DocumentKind;

/// A random passport number in the accepted format
pub fn passport_number() -> String {
    format!("P{:07}", (0..10_000_000u32).fake::<u32>())
}

/// A random national ID in the accepted format
pub fn national_id() -> String {
    format!(
        "{:06}{:06}",
        (0..1_000_000u32).fake::<u32>(),
        (0..1_000_000u32).fake::<u32>()
    )
}

/// A random document of the given kind with a format-valid number
pub fn document(kind: &DocumentKind) -> String {
    match kind {
        DocumentKind::Passport => passport_number(),
        DocumentKind::NationalId => national_id(),
        DocumentKind::TaxId => format!("ABCDE{:04}F", (0..10_000u32).fake::<u32>()),
        DocumentKind::VoterId => format!("ABC{:07}", (0..10_000_000u32).fake::<u32>()),
        DocumentKind::DriversLicense => format!("DL{:08}", (0..100_000_000u32).fake::<u32>()),
        DocumentKind::UtilityBill | DocumentKind::Other(_) => {
            format!("ACC-{:06}", (0..1_000_000u32).fake::<u32>())
        }
    }
}

/// A random ticket subject line
pub fn ticket_subject() -> String {
    Sentence(3..8).fake()
}

/// A random customer reference
pub fn customer() -> CustomerId {
    CustomerId::new_v7()
}
