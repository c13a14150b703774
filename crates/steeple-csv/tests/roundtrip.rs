// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export -> import -> export stability.

use std::collections::HashSet;

use proptest::prelude::*;
use steeple_core::{Lead, NewLead};
use steeple_csv::{leads_to_csv, parse_csv, plan_import};

fn materialize(leads: Vec<NewLead>) -> Vec<Lead> {
    leads
        .into_iter()
        .enumerate()
        .map(|(i, n)| Lead {
            id: format!("lead-{i}"),
            church_name: n.church_name,
            website: n.website,
            livestream_status: n.livestream_status,
            livestream_url: n.livestream_url,
            city: n.city,
            state: n.state,
            contact_name: n.contact_name,
            contact_role: n.contact_role,
            phone: n.phone,
            email: n.email,
            owner: n.owner,
            stage: n.stage,
            tier_interest: n.tier_interest,
            estimated_gear_budget: n.estimated_gear_budget,
            notes: n.notes,
            next_follow_up_at: n.next_follow_up_at,
            ..Lead::default()
        })
        .collect()
}

const SOURCE: &str = "church_name,website,has_livestream,livestream_url,city,state,contact_name,contact_role,phone,email,owner,stage,next_followup_date,notes,tier_interest,estimated_gear_budget
Grace Church,grace.org,yes,https://youtube.com/@grace,Austin,TX,Pat Lee,Pastor,555-0100,pat@grace.org,Carmen,Contacted,3/9/2026,\"Wants 2 cams, 1 switcher\",Pro,\"$4,500\"
Hope Chapel,,unknown,,Waco,TX,,,,,,Proposal Sent,,\"Said \"\"call me\"\" in spring\",,
First Baptist,,,,Tulsa,OK,Dana,,,,Adrian,Lead,12/31/2026,,Starter,";

#[test]
fn import_produced_leads_export_byte_identically() {
    let first = plan_import(SOURCE, HashSet::new(), "Adrian").unwrap();
    assert_eq!(first.leads.len(), 3);
    let exported = leads_to_csv(&materialize(first.leads)).unwrap();

    let second = plan_import(&exported, HashSet::new(), "Adrian").unwrap();
    let reexported = leads_to_csv(&materialize(second.leads)).unwrap();
    assert_eq!(exported, reexported);
}

#[test]
fn exported_rows_parse_back_to_same_fields() {
    let plan = plan_import(SOURCE, HashSet::new(), "Adrian").unwrap();
    let leads = materialize(plan.leads);
    let parsed = parse_csv(&leads_to_csv(&leads).unwrap());
    assert_eq!(parsed.rows.len(), 3);
    assert_eq!(parsed.rows[0][13], "Wants 2 cams, 1 switcher");
    assert_eq!(parsed.rows[1][13], "Said \"call me\" in spring");
    assert_eq!(parsed.rows[2][12], "12/31/2026");
    assert_eq!(parsed.rows[1][10], "Adrian");
}

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .@/$-]{0,12}".prop_map(|s| s.trim().to_string())
}

proptest! {
    #[test]
    fn plain_fields_survive_export_and_parse(
        church in "[A-Za-z][A-Za-z ]{0,10}[A-Za-z]",
        website in field(),
        notes in field(),
        phone in field(),
    ) {
        let lead = Lead {
            church_name: church.clone(),
            website: website.clone(),
            notes: notes.clone(),
            phone: phone.clone(),
            city: "Austin".into(),
            state: "TX".into(),
            owner: "Adrian".into(),
            ..Lead::default()
        };
        let parsed = parse_csv(&leads_to_csv([&lead]).unwrap());
        let row = &parsed.rows[0];
        prop_assert_eq!(&row[0], &church);
        prop_assert_eq!(&row[1], &website);
        prop_assert_eq!(&row[8], &phone);
        prop_assert_eq!(&row[13], &notes);
    }
}
