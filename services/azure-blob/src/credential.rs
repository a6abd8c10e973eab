// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use async_trait::async_trait;
use http::request::Parts;
use http::Uri;
use reqlist_core::utils::Redact;
use reqlist_core::{Context, Error, Result, SignRequest};
use std::fmt::{Debug, Formatter};

use crate::Config;

/// Credential enum for the authentication methods built into this crate.
///
/// Other methods (shared key, OAuth) are plugged in through
/// [`SignRequest`] by the caller.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credential {
    /// Anonymous access to a public container.
    #[default]
    Anonymous,
    /// SAS (Shared Access Signature) token authentication
    SasToken {
        /// SAS token, with or without the leading `?`.
        token: String,
    },
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Anonymous => f.write_str("Credential::Anonymous"),
            Credential::SasToken { token } => f
                .debug_struct("Credential::SasToken")
                .field("token", &Redact::from(token))
                .finish(),
        }
    }
}

impl Credential {
    /// Pick the credential configured in `config`.
    pub fn from_config(config: &Config) -> Self {
        match config.sas_token.as_deref().map(|v| v.trim_start_matches('?')) {
            Some(token) if !token.is_empty() => Credential::SasToken {
                token: token.to_string(),
            },
            _ => Credential::Anonymous,
        }
    }
}

#[async_trait]
impl SignRequest for Credential {
    async fn sign_request(&self, _: &Context, req: &mut Parts) -> Result<()> {
        let token = match self {
            Credential::Anonymous => return Ok(()),
            Credential::SasToken { token } => token.trim_start_matches('?'),
        };

        let uri = req.uri.to_string();
        let signed = if req.uri.query().is_some() {
            format!("{uri}&{token}")
        } else {
            format!("{uri}?{token}")
        };

        req.uri = signed.parse::<Uri>().map_err(|e| {
            Error::config_invalid("sas token can't be appended to the request uri")
                .with_source(e)
                .with_context(format!("token: {:?}", Redact::from(token)))
        })?;
        Ok(())
    }
}
