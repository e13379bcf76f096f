use shared::domain::{MemberClass, MemberRecord, MemberType, PaymentMode};

/// The register as it stands when the service starts with seeding enabled.
pub fn seed_members() -> Vec<MemberRecord> {
    vec![
        seeded(
            MemberRecord::new("001", "Rajesh Kumar", MemberType::Regular, "1", "9876543210"),
            SeedDetails {
                member_class: MemberClass::A,
                admission_date: "2020-01-15",
                address: "123 Main Street, Delhi",
                share_no: "SH001",
                no_of_share: "5",
                share_capital_amount: "50000",
                gender: "Male",
                caste: "General",
                aadhaar: "1234-5678-9012",
                family_card: "FC001",
                voter_id: "VID001",
                pan: "ABCDE1234F",
                admission_fee_paid: "5000",
                nominee_name: "Priya Kumar",
                relationship: "Wife",
                total_amount: "100000",
                paid_amount: "75000",
                remaining_amount: "25000",
                mode_of_payment: PaymentMode::BankTransfer,
            },
        ),
        seeded(
            MemberRecord::new("002", "Priya Sharma", MemberType::Associate, "2", "9876543211"),
            SeedDetails {
                member_class: MemberClass::B,
                admission_date: "2020-03-20",
                address: "456 Park Avenue, Mumbai",
                share_no: "SH002",
                no_of_share: "3",
                share_capital_amount: "30000",
                gender: "Female",
                caste: "OBC",
                aadhaar: "2234-5678-9012",
                family_card: "FC002",
                voter_id: "VID002",
                pan: "BCDEF2345G",
                admission_fee_paid: "3000",
                nominee_name: "Amit Sharma",
                relationship: "Husband",
                total_amount: "60000",
                paid_amount: "60000",
                remaining_amount: "0",
                mode_of_payment: PaymentMode::Cheque,
            },
        ),
        seeded(
            MemberRecord::new("003", "Amit Patel", MemberType::Regular, "1", "9876543212"),
            SeedDetails {
                member_class: MemberClass::A,
                admission_date: "2021-06-10",
                address: "789 Garden Road, Pune",
                share_no: "SH003",
                no_of_share: "7",
                share_capital_amount: "70000",
                gender: "Male",
                caste: "General",
                aadhaar: "3234-5678-9012",
                family_card: "FC003",
                voter_id: "VID003",
                pan: "CDEFG3456H",
                admission_fee_paid: "7000",
                nominee_name: "Sunita Patel",
                relationship: "Wife",
                total_amount: "150000",
                paid_amount: "50000",
                remaining_amount: "100000",
                mode_of_payment: PaymentMode::Cash,
            },
        ),
        seeded(
            MemberRecord::new("010", "Sunita Singh", MemberType::Premium, "4", "9876543220"),
            SeedDetails {
                member_class: MemberClass::APlus,
                admission_date: "2019-12-05",
                address: "321 Elite Colony, Bangalore",
                share_no: "SH010",
                no_of_share: "10",
                share_capital_amount: "100000",
                gender: "Female",
                caste: "SC",
                aadhaar: "4234-5678-9012",
                family_card: "FC010",
                voter_id: "VID010",
                pan: "DEFGH4567I",
                admission_fee_paid: "10000",
                nominee_name: "Raj Singh",
                relationship: "Son",
                total_amount: "200000",
                paid_amount: "150000",
                remaining_amount: "50000",
                mode_of_payment: PaymentMode::Online,
            },
        ),
    ]
}

struct SeedDetails {
    member_class: MemberClass,
    admission_date: &'static str,
    address: &'static str,
    share_no: &'static str,
    no_of_share: &'static str,
    share_capital_amount: &'static str,
    gender: &'static str,
    caste: &'static str,
    aadhaar: &'static str,
    family_card: &'static str,
    voter_id: &'static str,
    pan: &'static str,
    admission_fee_paid: &'static str,
    nominee_name: &'static str,
    relationship: &'static str,
    total_amount: &'static str,
    paid_amount: &'static str,
    remaining_amount: &'static str,
    mode_of_payment: PaymentMode,
}

fn seeded(mut record: MemberRecord, details: SeedDetails) -> MemberRecord {
    record.member_class = Some(details.member_class);
    record.admission_date = Some(details.admission_date.into());
    record.address = Some(details.address.into());
    record.share_no = Some(details.share_no.into());
    record.no_of_share = Some(details.no_of_share.into());
    record.share_capital_amount = Some(details.share_capital_amount.into());
    record.gender = Some(details.gender.into());
    record.caste = Some(details.caste.into());
    record.aadhaar = Some(details.aadhaar.into());
    record.family_card = Some(details.family_card.into());
    record.voter_id = Some(details.voter_id.into());
    record.pan = Some(details.pan.into());
    record.admission_fee_paid = Some(details.admission_fee_paid.into());
    record.nominee_name = Some(details.nominee_name.into());
    record.relationship = Some(details.relationship.into());
    record.total_amount = Some(details.total_amount.into());
    record.paid_amount = Some(details.paid_amount.into());
    record.remaining_amount = Some(details.remaining_amount.into());
    record.mode_of_payment = Some(details.mode_of_payment);
    record
}
