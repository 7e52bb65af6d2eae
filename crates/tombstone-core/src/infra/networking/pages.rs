// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::CheckError;
use crate::domain::interfaces::PageFetching;
use crate::domain::models::FetchedPage;
use crate::infra::networking::http::HTTPClient;
use reqwest::header;
use std::collections::HashMap;

pub struct WebPageFetcher {
    http_client: HTTPClient,
}

impl WebPageFetcher {
    pub fn new(http_client: HTTPClient) -> Self {
        Self { http_client }
    }
}

impl PageFetching for WebPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CheckError> {
        let response = match self.http_client.get(url).send().await {
            Ok(inner) => inner,
            Err(incoming) => {
                log::info!("[tombstone.pages] cannot fetch {} : {}", url, incoming);
                return Err(incoming.into());
            },
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_lowercase(), value.to_string()))
            })
            .collect::<HashMap<_, _>>();

        let cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|raw_cookie| raw_cookie.split('=').next())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>();

        let body = response.text().await?;

        log::info!("[tombstone.pages] fetched {} (HTTP status = {})", final_url, status);

        Ok(FetchedPage {
            status,
            final_url,
            headers,
            cookies,
            body,
        })
    }
}
