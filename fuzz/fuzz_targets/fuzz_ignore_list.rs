// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for ignore list parsing

#![no_main]

use libfuzzer_sys::fuzz_target;
use resfs_file::IgnoreList;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let list = IgnoreList::parse(&text);

    for name in list.iter() {
        assert!(!name.is_empty());
        assert_eq!(name, name.trim());
        assert!(list.contains(name));
    }
    assert!(list.len() <= text.lines().count());
});
