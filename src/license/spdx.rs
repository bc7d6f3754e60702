use serde::{Deserialize, Serialize};

use crate::license::expression::{
    License, LicenseException, LicenseExpression, StandardId, SPDX_PROVIDER,
};
use crate::models::LicenseRisk::{self, Permissive, StrongCopyleft, Unknown, WeakCopyleft};

/// Canonical description of a standard license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub uris: Vec<String>,
    /// Alternate names matched exactly (case-insensitive) before any fuzzy matching.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_risk")]
    pub risk: LicenseRisk,
    /// Characteristic passage of the license text, used by the content classifier.
    #[serde(default)]
    pub text: String,
}

fn default_risk() -> LicenseRisk {
    LicenseRisk::Unknown
}

impl LicenseRecord {
    pub fn to_license(&self) -> License {
        License::Standard(StandardId::new(
            SPDX_PROVIDER,
            self.id.clone(),
            self.title.clone(),
            self.uris.clone(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub id: String,
    pub title: String,
}

impl ExceptionRecord {
    pub fn to_exception(&self) -> LicenseException {
        LicenseException::Standard(StandardId::new(
            SPDX_PROVIDER,
            self.id.clone(),
            self.title.clone(),
            Vec::new(),
        ))
    }
}

/// Lookup table of standard licenses and exceptions.
#[derive(Debug, Clone)]
pub struct LicenseCatalog {
    licenses: Vec<LicenseRecord>,
    exceptions: Vec<ExceptionRecord>,
}

impl LicenseCatalog {
    /// Catalog of the built-in SPDX licenses and exceptions.
    pub fn builtin() -> Self {
        let licenses = LICENSES
            .iter()
            .map(|(id, title, risk, uris, aliases)| LicenseRecord {
                id: (*id).to_string(),
                title: (*title).to_string(),
                uris: uris.iter().map(|u| (*u).to_string()).collect(),
                aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
                risk: *risk,
                text: FINGERPRINTS
                    .iter()
                    .find(|(fid, _)| fid == id)
                    .map(|(_, text)| (*text).to_string())
                    .unwrap_or_default(),
            })
            .collect();
        let exceptions = EXCEPTIONS
            .iter()
            .map(|(id, title)| ExceptionRecord {
                id: (*id).to_string(),
                title: (*title).to_string(),
            })
            .collect();
        Self {
            licenses,
            exceptions,
        }
    }

    /// Add a record, replacing any existing record with the same id.
    pub fn add_license(&mut self, record: LicenseRecord) {
        match self.licenses.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.licenses.push(record),
        }
    }

    pub fn licenses(&self) -> &[LicenseRecord] {
        &self.licenses
    }

    pub fn exceptions(&self) -> &[ExceptionRecord] {
        &self.exceptions
    }

    /// Case-insensitive identifier lookup.
    pub fn find_license(&self, id: &str) -> Option<&LicenseRecord> {
        let id = id.trim();
        self.licenses.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }

    /// Case-insensitive lookup by title or alias.
    pub fn find_by_alias(&self, name: &str) -> Option<&LicenseRecord> {
        let name = name.trim();
        self.licenses.iter().find(|r| {
            r.title.eq_ignore_ascii_case(name)
                || r.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// Case-insensitive lookup by exception id or title.
    pub fn find_exception(&self, name: &str) -> Option<&ExceptionRecord> {
        let name = name.trim();
        self.exceptions
            .iter()
            .find(|r| r.id.eq_ignore_ascii_case(name) || r.title.eq_ignore_ascii_case(name))
    }

    /// The catalog's license for `id`, or a bare standard license when unknown.
    pub fn license(&self, id: &str) -> License {
        self.find_license(id)
            .map(LicenseRecord::to_license)
            .unwrap_or_else(|| License::spdx(id))
    }

    /// `expr` with every standard identifier spelled as the catalog spells it.
    /// Free-text leaves and unknown identifiers are left alone.
    pub fn canonicalize(&self, expr: &LicenseExpression) -> LicenseExpression {
        expr.map_leaves(
            &|license: &License| self.respell_license(license),
            &|exception: &LicenseException| self.respell_exception(exception),
        )
    }

    /// The catalog's spelling of a standard license, when it differs.
    pub fn respell_license(&self, license: &License) -> Option<License> {
        let License::Standard(standard) = license else {
            return None;
        };
        self.find_license(&standard.id)
            .filter(|record| record.id != standard.id)
            .map(LicenseRecord::to_license)
    }

    /// The catalog's spelling of a standard exception, when it differs.
    pub fn respell_exception(&self, exception: &LicenseException) -> Option<LicenseException> {
        let LicenseException::Standard(standard) = exception else {
            return None;
        };
        self.find_exception(&standard.id)
            .filter(|record| record.id != standard.id)
            .map(ExceptionRecord::to_exception)
    }
}

impl Default for LicenseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Families published as `X-v-only` / `X-v-or-later`, versions ascending.
pub const ONLY_OR_LATER_FAMILIES: &[(&str, &[&str])] = &[
    ("GPL", &["1.0", "2.0", "3.0"]),
    ("LGPL", &["2.0", "2.1", "3.0"]),
    ("AGPL", &["1.0", "3.0"]),
    ("GFDL", &["1.1", "1.2", "1.3"]),
];

/// Families published as plain `X-v`, versions ascending.
pub const VERSIONED_FAMILIES: &[(&str, &[&str])] = &[
    ("Apache", &["1.0", "1.1", "2.0"]),
    ("MPL", &["1.0", "1.1", "2.0"]),
    ("EPL", &["1.0", "2.0"]),
    ("CDDL", &["1.0", "1.1"]),
    ("EUPL", &["1.0", "1.1", "1.2"]),
    ("Artistic", &["1.0", "2.0"]),
    ("CC-BY", &["3.0", "4.0"]),
];

/// Deprecated SPDX identifiers that fold a license and an exception together.
pub const DEPRECATED_WITH_EXCEPTION: &[(&str, &str, &str)] = &[
    (
        "GPL-2.0-with-classpath-exception",
        "GPL-2.0-only",
        "Classpath-exception-2.0",
    ),
    (
        "GPL-2.0-with-GCC-exception",
        "GPL-2.0-only",
        "GCC-exception-2.0",
    ),
    (
        "GPL-3.0-with-GCC-exception",
        "GPL-3.0-only",
        "GCC-exception-3.1",
    ),
    (
        "GPL-2.0-with-autoconf-exception",
        "GPL-2.0-only",
        "Autoconf-exception-2.0",
    ),
];

type Entry = (
    &'static str,
    &'static str,
    LicenseRisk,
    &'static [&'static str],
    &'static [&'static str],
);

const LICENSES: &[Entry] = &[
    // Permissive
    (
        "MIT",
        "MIT License",
        Permissive,
        &["https://opensource.org/licenses/MIT", "https://opensource.org/license/mit"],
        &["The MIT License", "MIT license (MIT)", "Expat License"],
    ),
    ("MIT-0", "MIT No Attribution", Permissive, &["https://opensource.org/licenses/MIT-0"], &[]),
    (
        "Apache-1.0",
        "Apache License 1.0",
        Permissive,
        &["https://www.apache.org/licenses/LICENSE-1.0"],
        &[],
    ),
    (
        "Apache-1.1",
        "Apache License 1.1",
        Permissive,
        &[
            "https://www.apache.org/licenses/LICENSE-1.1",
            "https://opensource.org/licenses/Apache-1.1",
        ],
        &[],
    ),
    (
        "Apache-2.0",
        "Apache License 2.0",
        Permissive,
        &[
            "https://www.apache.org/licenses/LICENSE-2.0",
            "https://opensource.org/licenses/Apache-2.0",
        ],
        &[
            "Apache 2.0",
            "Apache License, Version 2.0",
            "The Apache Software License, Version 2.0",
            "The Apache License, Version 2.0",
            "ASL 2.0",
            "Apache-2",
        ],
    ),
    (
        "BSD-2-Clause",
        "BSD 2-Clause \"Simplified\" License",
        Permissive,
        &["https://opensource.org/licenses/BSD-2-Clause"],
        &["BSD 2-Clause", "Simplified BSD", "FreeBSD License"],
    ),
    (
        "BSD-3-Clause",
        "BSD 3-Clause \"New\" or \"Revised\" License",
        Permissive,
        &["https://opensource.org/licenses/BSD-3-Clause"],
        &[
            "BSD 3-Clause",
            "New BSD",
            "New BSD License",
            "Modified BSD",
            "Revised BSD",
            "BSD",
            "BSD License",
            "The BSD License",
        ],
    ),
    ("0BSD", "BSD Zero Clause License", Permissive, &["https://opensource.org/licenses/0BSD"], &[]),
    (
        "ISC",
        "ISC License",
        Permissive,
        &["https://opensource.org/licenses/ISC"],
        &[],
    ),
    (
        "Unlicense",
        "The Unlicense",
        Permissive,
        &["https://unlicense.org"],
        &["Unlicense"],
    ),
    ("Zlib", "zlib License", Permissive, &["https://zlib.net/zlib_license.html"], &[]),
    (
        "CC0-1.0",
        "Creative Commons Zero v1.0 Universal",
        Permissive,
        &[
            "https://creativecommons.org/publicdomain/zero/1.0/legalcode",
            "https://creativecommons.org/publicdomain/zero/1.0",
        ],
        &["CC0", "CC0 1.0 Universal"],
    ),
    (
        "CC-BY-3.0",
        "Creative Commons Attribution 3.0 Unported",
        Permissive,
        &["https://creativecommons.org/licenses/by/3.0/legalcode"],
        &[],
    ),
    (
        "CC-BY-4.0",
        "Creative Commons Attribution 4.0 International",
        Permissive,
        &["https://creativecommons.org/licenses/by/4.0/legalcode"],
        &[],
    ),
    ("WTFPL", "Do What The F*ck You Want To Public License", Permissive, &["http://www.wtfpl.net/about"], &[]),
    (
        "PSF-2.0",
        "Python Software Foundation License 2.0",
        Permissive,
        &[],
        &["PSF License"],
    ),
    ("Python-2.0", "Python License 2.0", Permissive, &["https://opensource.org/licenses/Python-2.0"], &[]),
    (
        "BlueOak-1.0.0",
        "Blue Oak Model License 1.0.0",
        Permissive,
        &["https://blueoakcouncil.org/license/1.0.0"],
        &[],
    ),
    ("Artistic-1.0", "Artistic License 1.0", Permissive, &["https://opensource.org/licenses/Artistic-1.0"], &[]),
    ("Artistic-2.0", "Artistic License 2.0", Permissive, &["https://opensource.org/licenses/Artistic-2.0"], &[]),
    (
        "BSL-1.0",
        "Boost Software License 1.0",
        Permissive,
        &["https://www.boost.org/LICENSE_1_0.txt"],
        &["Boost License"],
    ),
    ("OFL-1.1", "SIL Open Font License 1.1", Permissive, &["https://scripts.sil.org/OFL"], &[]),
    // Weak copyleft
    (
        "LGPL-2.0-only",
        "GNU Library General Public License v2 only",
        WeakCopyleft,
        &["https://www.gnu.org/licenses/old-licenses/lgpl-2.0.html"],
        &["LGPL-2.0"],
    ),
    ("LGPL-2.0-or-later", "GNU Library General Public License v2 or later", WeakCopyleft, &[], &[]),
    (
        "LGPL-2.1-only",
        "GNU Lesser General Public License v2.1 only",
        WeakCopyleft,
        &[
            "https://www.gnu.org/licenses/old-licenses/lgpl-2.1.html",
            "https://www.gnu.org/licenses/old-licenses/lgpl-2.1",
        ],
        &["LGPL-2.1", "GNU LGPL v2.1", "LGPL v2.1", "LGPLv2.1"],
    ),
    ("LGPL-2.1-or-later", "GNU Lesser General Public License v2.1 or later", WeakCopyleft, &[], &[]),
    (
        "LGPL-3.0-only",
        "GNU Lesser General Public License v3.0 only",
        WeakCopyleft,
        &["https://www.gnu.org/licenses/lgpl-3.0.html", "https://www.gnu.org/licenses/lgpl-3.0"],
        &["LGPL-3.0", "GNU LGPL v3", "LGPL v3", "LGPLv3"],
    ),
    ("LGPL-3.0-or-later", "GNU Lesser General Public License v3.0 or later", WeakCopyleft, &[], &[]),
    ("MPL-1.0", "Mozilla Public License 1.0", WeakCopyleft, &["https://www.mozilla.org/MPL/1.0"], &[]),
    ("MPL-1.1", "Mozilla Public License 1.1", WeakCopyleft, &["https://www.mozilla.org/MPL/1.1"], &[]),
    (
        "MPL-2.0",
        "Mozilla Public License 2.0",
        WeakCopyleft,
        &["https://www.mozilla.org/MPL/2.0", "https://mozilla.org/MPL/2.0"],
        &["MPL 2.0", "MPLv2"],
    ),
    (
        "EPL-1.0",
        "Eclipse Public License 1.0",
        WeakCopyleft,
        &["https://www.eclipse.org/legal/epl-v10.html"],
        &[],
    ),
    (
        "EPL-2.0",
        "Eclipse Public License 2.0",
        WeakCopyleft,
        &["https://www.eclipse.org/legal/epl-2.0", "https://www.eclipse.org/legal/epl-v20.html"],
        &[],
    ),
    (
        "CDDL-1.0",
        "Common Development and Distribution License 1.0",
        WeakCopyleft,
        &["https://opensource.org/licenses/CDDL-1.0"],
        &[],
    ),
    (
        "CDDL-1.1",
        "Common Development and Distribution License 1.1",
        WeakCopyleft,
        &["https://glassfish.java.net/public/CDDL+GPL_1_1.html"],
        &[],
    ),
    ("EUPL-1.0", "European Union Public License 1.0", WeakCopyleft, &[], &[]),
    ("EUPL-1.2", "European Union Public License 1.2", WeakCopyleft, &["https://joinup.ec.europa.eu/page/eupl-text-11-12"], &[]),
    ("OSL-3.0", "Open Software License 3.0", WeakCopyleft, &["https://opensource.org/licenses/OSL-3.0"], &[]),
    ("APSL-2.0", "Apple Public Source License 2.0", WeakCopyleft, &[], &[]),
    // Strong copyleft
    (
        "GPL-1.0-only",
        "GNU General Public License v1.0 only",
        StrongCopyleft,
        &["https://www.gnu.org/licenses/old-licenses/gpl-1.0.html"],
        &["GPL-1.0"],
    ),
    ("GPL-1.0-or-later", "GNU General Public License v1.0 or later", StrongCopyleft, &[], &[]),
    (
        "GPL-2.0-only",
        "GNU General Public License v2.0 only",
        StrongCopyleft,
        &[
            "https://www.gnu.org/licenses/old-licenses/gpl-2.0.html",
            "https://www.gnu.org/licenses/old-licenses/gpl-2.0",
            "https://opensource.org/licenses/GPL-2.0",
        ],
        &[
            "GPL-2.0",
            "GNU GPL v2",
            "GNU General Public License v2",
            "GNU General Public License, version 2",
            "GPL v2",
            "GPLv2",
        ],
    ),
    ("GPL-2.0-or-later", "GNU General Public License v2.0 or later", StrongCopyleft, &[], &[]),
    (
        "GPL-3.0-only",
        "GNU General Public License v3.0 only",
        StrongCopyleft,
        &[
            "https://www.gnu.org/licenses/gpl-3.0.html",
            "https://www.gnu.org/licenses/gpl-3.0",
            "https://opensource.org/licenses/GPL-3.0",
        ],
        &[
            "GPL-3.0",
            "GNU GPL v3",
            "GNU General Public License v3",
            "GNU General Public License, version 3",
            "GPL v3",
            "GPLv3",
        ],
    ),
    ("GPL-3.0-or-later", "GNU General Public License v3.0 or later", StrongCopyleft, &[], &[]),
    ("AGPL-1.0-only", "Affero General Public License v1.0 only", StrongCopyleft, &[], &["AGPL-1.0"]),
    ("AGPL-1.0-or-later", "Affero General Public License v1.0 or later", StrongCopyleft, &[], &[]),
    (
        "AGPL-3.0-only",
        "GNU Affero General Public License v3.0 only",
        StrongCopyleft,
        &["https://www.gnu.org/licenses/agpl-3.0.html", "https://www.gnu.org/licenses/agpl-3.0"],
        &["AGPL-3.0", "AGPL v3", "AGPLv3", "GNU AGPL v3"],
    ),
    ("AGPL-3.0-or-later", "GNU Affero General Public License v3.0 or later", StrongCopyleft, &[], &[]),
    ("EUPL-1.1", "European Union Public License 1.1", StrongCopyleft, &[], &[]),
    // Documentation licenses, no default verdict
    ("GFDL-1.1-only", "GNU Free Documentation License v1.1 only", Unknown, &[], &["GFDL-1.1"]),
    ("GFDL-1.1-or-later", "GNU Free Documentation License v1.1 or later", Unknown, &[], &[]),
    ("GFDL-1.2-only", "GNU Free Documentation License v1.2 only", Unknown, &[], &["GFDL-1.2"]),
    ("GFDL-1.2-or-later", "GNU Free Documentation License v1.2 or later", Unknown, &[], &[]),
    (
        "GFDL-1.3-only",
        "GNU Free Documentation License v1.3 only",
        Unknown,
        &["https://www.gnu.org/licenses/fdl-1.3.html"],
        &["GFDL-1.3"],
    ),
    ("GFDL-1.3-or-later", "GNU Free Documentation License v1.3 or later", Unknown, &[], &[]),
];

const EXCEPTIONS: &[(&str, &str)] = &[
    ("Classpath-exception-2.0", "Classpath exception 2.0"),
    ("LLVM-exception", "LLVM Exception"),
    ("GCC-exception-2.0", "GCC Runtime Library exception 2.0"),
    ("GCC-exception-3.1", "GCC Runtime Library exception 3.1"),
    ("Autoconf-exception-2.0", "Autoconf exception 2.0"),
    ("Autoconf-exception-3.0", "Autoconf exception 3.0"),
    ("Bison-exception-2.2", "Bison exception 2.2"),
    ("OpenJDK-assembly-exception-1.0", "OpenJDK Assembly exception 1.0"),
    ("Universal-FOSS-exception-1.0", "Universal FOSS Exception, Version 1.0"),
];

/// Characteristic opening passages of common license texts.
const FINGERPRINTS: &[(&str, &str)] = &[
    (
        "MIT",
        "Permission is hereby granted, free of charge, to any person obtaining a copy of this \
         software and associated documentation files, to deal in the Software without restriction, \
         including without limitation the rights to use, copy, modify, merge, publish, distribute, \
         sublicense, and/or sell copies of the Software. The above copyright notice and this \
         permission notice shall be included in all copies or substantial portions of the Software.",
    ),
    (
        "Apache-2.0",
        "Licensed under the Apache License, Version 2.0 (the \"License\"); you may not use this \
         file except in compliance with the License. You may obtain a copy of the License at \
         http://www.apache.org/licenses/LICENSE-2.0. Unless required by applicable law or agreed \
         to in writing, software distributed under the License is distributed on an \"AS IS\" BASIS.",
    ),
    (
        "BSD-2-Clause",
        "Redistribution and use in source and binary forms, with or without modification, are \
         permitted provided that the following conditions are met: Redistributions of source code \
         must retain the above copyright notice, this list of conditions and the following \
         disclaimer. Redistributions in binary form must reproduce the above copyright notice.",
    ),
    (
        "BSD-3-Clause",
        "Redistribution and use in source and binary forms, with or without modification, are \
         permitted provided that the following conditions are met. Neither the name of the \
         copyright holder nor the names of its contributors may be used to endorse or promote \
         products derived from this software without specific prior written permission.",
    ),
    (
        "ISC",
        "Permission to use, copy, modify, and/or distribute this software for any purpose with or \
         without fee is hereby granted, provided that the above copyright notice and this \
         permission notice appear in all copies.",
    ),
    (
        "Unlicense",
        "This is free and unencumbered software released into the public domain. Anyone is free \
         to copy, modify, publish, use, compile, sell, or distribute this software.",
    ),
    (
        "Zlib",
        "This software is provided 'as-is', without any express or implied warranty. The origin \
         of this software must not be misrepresented; you must not claim that you wrote the \
         original software. Altered source versions must be plainly marked as such.",
    ),
    (
        "CC0-1.0",
        "The person who associated a work with this deed has dedicated the work to the public \
         domain by waiving all of his or her rights to the work worldwide under copyright law.",
    ),
    (
        "MPL-2.0",
        "This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a \
         copy of the MPL was not distributed with this file, You can obtain one at \
         http://mozilla.org/MPL/2.0/.",
    ),
    (
        "EPL-2.0",
        "This program and the accompanying materials are made available under the terms of the \
         Eclipse Public License 2.0 which is available at http://www.eclipse.org/legal/epl-2.0.",
    ),
    (
        "GPL-2.0-only",
        "This program is free software; you can redistribute it and/or modify it under the terms \
         of the GNU General Public License as published by the Free Software Foundation; version 2 \
         of the License. This program is distributed in the hope that it will be useful, but \
         WITHOUT ANY WARRANTY.",
    ),
    (
        "GPL-3.0-only",
        "This program is free software: you can redistribute it and/or modify it under the terms \
         of the GNU General Public License as published by the Free Software Foundation, version 3 \
         of the License. You should have received a copy of the GNU General Public License along \
         with this program.",
    ),
    (
        "LGPL-2.1-only",
        "This library is free software; you can redistribute it and/or modify it under the terms \
         of the GNU Lesser General Public License as published by the Free Software Foundation; \
         version 2.1 of the License.",
    ),
    (
        "LGPL-3.0-only",
        "This library is free software: you can redistribute it and/or modify it under the terms \
         of the GNU Lesser General Public License as published by the Free Software Foundation, \
         version 3 of the License.",
    ),
    (
        "AGPL-3.0-only",
        "This program is free software: you can redistribute it and/or modify it under the terms \
         of the GNU Affero General Public License as published by the Free Software Foundation, \
         version 3 of the License.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::parser::parse;

    #[test]
    fn test_canonicalize_respells_standard_ids() {
        let catalog = LicenseCatalog::builtin();
        let expr = parse("apache-2.0 OR gpl-2.0-only WITH classpath-exception-2.0").unwrap();
        assert_eq!(
            catalog.canonicalize(&expr).to_string(),
            "Apache-2.0 OR GPL-2.0-only WITH Classpath-exception-2.0"
        );
        let unknown = parse("LicenseRef-acme+").unwrap();
        assert_eq!(catalog.canonicalize(&unknown), unknown);
    }

    #[test]
    fn test_find_license_is_case_insensitive() {
        let catalog = LicenseCatalog::builtin();
        assert_eq!(catalog.find_license("apache-2.0").unwrap().id, "Apache-2.0");
        assert!(catalog.find_license("CUSTOM-LICENSE-42").is_none());
    }

    #[test]
    fn test_find_by_alias() {
        let catalog = LicenseCatalog::builtin();
        assert_eq!(catalog.find_by_alias("MIT License").unwrap().id, "MIT");
        assert_eq!(
            catalog.find_by_alias("apache license, version 2.0").unwrap().id,
            "Apache-2.0"
        );
        assert_eq!(catalog.find_by_alias("GPLv2").unwrap().id, "GPL-2.0-only");
    }

    #[test]
    fn test_risk_families() {
        let catalog = LicenseCatalog::builtin();
        assert_eq!(catalog.find_license("MIT").unwrap().risk, LicenseRisk::Permissive);
        assert_eq!(catalog.find_license("LGPL-2.1-only").unwrap().risk, LicenseRisk::WeakCopyleft);
        assert_eq!(catalog.find_license("AGPL-3.0-only").unwrap().risk, LicenseRisk::StrongCopyleft);
    }

    #[test]
    fn test_ids_are_unique() {
        let catalog = LicenseCatalog::builtin();
        let mut ids: Vec<&str> = catalog.licenses().iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn test_fingerprints_attach_to_known_ids() {
        let catalog = LicenseCatalog::builtin();
        for (id, _) in FINGERPRINTS {
            assert!(!catalog.find_license(id).unwrap().text.is_empty(), "{id}");
        }
    }

    #[test]
    fn test_license_carries_metadata() {
        let catalog = LicenseCatalog::builtin();
        match catalog.license("MIT") {
            License::Standard(standard) => assert_eq!(standard.title, "MIT License"),
            other => panic!("expected standard license, got {other:?}"),
        }
        assert_eq!(catalog.license("Foo-1.0"), License::spdx("Foo-1.0"));
    }

    #[test]
    fn test_add_license_replaces_same_id() {
        let mut catalog = LicenseCatalog::builtin();
        let count = catalog.licenses().len();
        catalog.add_license(LicenseRecord {
            id: "MIT".to_string(),
            title: "Expat".to_string(),
            uris: Vec::new(),
            aliases: Vec::new(),
            risk: LicenseRisk::Permissive,
            text: String::new(),
        });
        assert_eq!(catalog.licenses().len(), count);
        assert_eq!(catalog.find_license("MIT").unwrap().title, "Expat");
    }

    #[test]
    fn test_find_exception_by_title() {
        let catalog = LicenseCatalog::builtin();
        assert_eq!(
            catalog.find_exception("classpath exception 2.0").unwrap().id,
            "Classpath-exception-2.0"
        );
    }
}
