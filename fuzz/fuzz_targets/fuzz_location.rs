// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for location parsing and child name validation

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resfs_core::uri;
use std::path::Path;

#[derive(Arbitrary, Debug)]
struct LocationInput {
    location: String,
    cwd: String,
    name: String,
}

fuzz_target!(|input: LocationInput| {
    // A name that validates must stay a single component when joined
    if uri::validate_name(&input.name).is_ok() {
        let joined = Path::new("/base").join(&input.name);
        assert_eq!(joined.parent(), Some(Path::new("/base")));
    }

    let normalized = uri::normalize(Path::new(&input.location));
    assert!(normalized.components().all(|c| c.as_os_str() != ".."));

    let cwd = uri::normalize(&Path::new("/").join(&input.cwd));
    if let Ok(location) = uri::parse_location(&input.location, &cwd) {
        let _ = uri::uri_to_path(&location);
    }
});
