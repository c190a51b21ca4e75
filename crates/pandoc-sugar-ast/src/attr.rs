/*
 * attr.rs
 * Copyright (c) 2025 Posit, PBC
 */

use hashlink::LinkedHashMap;

pub fn empty_attr() -> Attr {
    (String::new(), vec![], LinkedHashMap::new())
}

pub type Attr = (String, Vec<String>, LinkedHashMap<String, String>);
