mod affiliation;
pub use self::affiliation::{Affiliation, AffiliationId, AffiliationType, ConflictMarker};

mod bill;
pub use self::bill::{Bill, BillId, Sponsorship};

mod sponsor;
pub use self::sponsor::{Sponsor, SponsorId};

mod transparency;
pub use self::transparency::{DisclosureType, TransparencyRecord};
