//! Provider dispatcher
//!
//! Walks the candidate providers in order, asking the breaker before each
//! call. One call per provider per request: a timeout or error moves on to
//! the next candidate. Running out of candidates is a normal result, not
//! an error.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use dashmap::DashMap;
use reqwest::Client;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zonewatch_domain::constants::PROVIDERS_EXHAUSTED_MARKER;
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::ports::InferenceProvider;
use zonewatch_domain::value_objects::{
    AnalysisDetail, AnalysisRequest, AnalysisResult, AttemptOutcome, CircuitState,
    ProviderAttempt, ProviderConfig, ProviderKind, ProviderStatus,
};
use zonewatch_providers::inference::create_provider;

use super::circuit_breaker::CircuitBreakerRegistry;
use crate::metrics::MetricsAggregator;

/// Turns provider configuration into a callable provider
pub trait ProviderResolver: Send + Sync {
    /// Instance for `config`
    fn resolve(&self, config: &ProviderConfig) -> Result<Arc<dyn InferenceProvider>>;
}

/// Resolver backed by the provider crate, caching one instance per config
pub struct DefaultProviderResolver {
    client: Client,
    cache: DashMap<String, (ProviderConfig, Arc<dyn InferenceProvider>)>,
}

impl DefaultProviderResolver {
    /// Resolver sharing `client` across providers
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: DashMap::new(),
        }
    }
}

impl ProviderResolver for DefaultProviderResolver {
    fn resolve(&self, config: &ProviderConfig) -> Result<Arc<dyn InferenceProvider>> {
        if let Some(cached) = self.cache.get(&config.id) {
            if cached.0 == *config {
                return Ok(Arc::clone(&cached.1));
            }
        }
        let provider = create_provider(config, self.client.clone())?;
        self.cache
            .insert(config.id.clone(), (config.clone(), Arc::clone(&provider)));
        Ok(provider)
    }
}

/// Routes analysis requests across providers
pub struct ProviderDispatcher {
    breakers: Arc<CircuitBreakerRegistry>,
    metrics: Arc<MetricsAggregator>,
    resolver: Arc<dyn ProviderResolver>,
    preferred: ArcSwapOption<String>,
}

impl ProviderDispatcher {
    /// Dispatcher over the given breakers, metrics and resolver
    pub fn new(
        breakers: Arc<CircuitBreakerRegistry>,
        metrics: Arc<MetricsAggregator>,
        resolver: Arc<dyn ProviderResolver>,
    ) -> Self {
        Self {
            breakers,
            metrics,
            resolver,
            preferred: ArcSwapOption::empty(),
        }
    }

    /// Breaker registry
    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Provider chosen through [`switch_provider`](Self::switch_provider)
    pub fn preferred(&self) -> Option<String> {
        self.preferred.load_full().map(|p| p.as_ref().clone())
    }

    /// Enabled providers in call order.
    ///
    /// Ascending priority, ties by id, with the preferred provider first.
    pub fn candidates(&self, providers: &[ProviderConfig]) -> Vec<ProviderConfig> {
        let mut candidates: Vec<ProviderConfig> =
            providers.iter().filter(|p| p.enabled).cloned().collect();
        candidates.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        if let Some(preferred) = self.preferred.load_full() {
            if let Some(pos) = candidates.iter().position(|p| p.id == *preferred) {
                let chosen = candidates.remove(pos);
                candidates.insert(0, chosen);
            }
        }
        candidates
    }

    /// Run `request` against `providers`
    pub async fn dispatch(
        &self,
        providers: &[ProviderConfig],
        request: &AnalysisRequest,
    ) -> AnalysisResult {
        let started = Instant::now();
        let mut attempts = Vec::new();
        let mut cost = 0.0;

        for candidate in self.candidates(providers) {
            let Some(permit) = self.breakers.acquire(&candidate.id) else {
                let skipped = Error::provider_unavailable(&candidate.id);
                debug!(zone = %request.zone, kind = %skipped.kind(), "{skipped}");
                attempts.push(ProviderAttempt {
                    provider: candidate.id.clone(),
                    outcome: AttemptOutcome::from_error(&skipped),
                    latency: std::time::Duration::ZERO,
                });
                continue;
            };

            // Dropping this future mid-call drops the permit with it
            let call_started = Instant::now();
            let outcome = self.call(&candidate, request).await;
            let latency = call_started.elapsed();
            let success = outcome.is_ok();

            permit.complete(success, latency);
            self.metrics.record(
                &candidate.id,
                &request.zone,
                success,
                latency,
                candidate.cost_per_request,
            );
            cost += candidate.cost_per_request;

            match outcome {
                Ok(output) => {
                    attempts.push(ProviderAttempt {
                        provider: candidate.id.clone(),
                        outcome: AttemptOutcome::Succeeded,
                        latency,
                    });
                    debug!(
                        zone = %request.zone,
                        provider = %candidate.id,
                        latency_ms = latency.as_millis() as u64,
                        tasks = output.tasks.len(),
                        "Analysis completed"
                    );
                    return AnalysisResult {
                        request_id: request.id,
                        zone: request.zone.clone(),
                        provider_id: Some(candidate.id),
                        success: true,
                        latency: started.elapsed(),
                        cost_estimate: cost,
                        detail: AnalysisDetail::Completed { output, attempts },
                        completed_at: Utc::now(),
                    };
                }
                Err(err) => {
                    warn!(
                        zone = %request.zone,
                        provider = %candidate.id,
                        kind = %err.kind(),
                        error = %err,
                        "Provider attempt failed"
                    );
                    attempts.push(ProviderAttempt {
                        provider: candidate.id,
                        outcome: AttemptOutcome::from_error(&err),
                        latency,
                    });
                }
            }
        }

        let exhausted = Error::providers_exhausted(attempts.iter().map(|a| a.provider.as_str()));
        warn!(
            zone = %request.zone,
            kind = %exhausted.kind(),
            error = %exhausted,
            "{}", PROVIDERS_EXHAUSTED_MARKER
        );
        AnalysisResult {
            request_id: request.id,
            zone: request.zone.clone(),
            provider_id: None,
            success: false,
            latency: started.elapsed(),
            cost_estimate: cost,
            detail: AnalysisDetail::Exhausted {
                marker: PROVIDERS_EXHAUSTED_MARKER.to_string(),
                attempts,
            },
            completed_at: Utc::now(),
        }
    }

    async fn call(
        &self,
        config: &ProviderConfig,
        request: &AnalysisRequest,
    ) -> Result<zonewatch_domain::value_objects::InferenceOutput> {
        let provider = self.resolver.resolve(config)?;
        match tokio::time::timeout(config.timeout(), provider.analyze(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::provider_timeout(&config.id, config.timeout())),
        }
    }

    /// Make `name` the first candidate.
    ///
    /// Refused for unknown, disabled or open-circuit providers and for
    /// providers whose credential does not resolve.
    pub fn switch_provider(&self, providers: &[ProviderConfig], name: &str) -> Result<()> {
        let provider = providers
            .iter()
            .find(|p| p.id == name)
            .ok_or_else(|| Error::provider_switch(name, "unknown provider"))?;
        if !provider.enabled {
            return Err(Error::provider_switch(name, "provider is disabled"));
        }
        if self.breakers.state(name) == CircuitState::Open {
            return Err(Error::provider_switch(name, "circuit is open"));
        }
        match (&provider.credential, provider.kind) {
            (Some(credential), _) => {
                credential.resolve()?;
            }
            (None, ProviderKind::OpenAi) => {
                return Err(Error::authentication(format!(
                    "provider {name} has no credential configured"
                )));
            }
            (None, _) => {}
        }
        self.preferred.store(Some(Arc::new(name.to_string())));
        info!(provider = %name, "Preferred provider switched");
        Ok(())
    }

    /// Align breakers with `providers` and drop a preference that no
    /// longer names a usable provider
    pub fn reconcile(&self, providers: &[ProviderConfig]) {
        self.breakers.reconcile(providers);
        if let Some(preferred) = self.preferred.load_full() {
            let still_usable = providers
                .iter()
                .any(|p| p.id == *preferred && p.enabled);
            if !still_usable {
                self.preferred.store(None);
                info!(provider = %preferred, "Preferred provider removed from configuration");
            }
        }
    }

    /// Health of every configured provider, in candidate order
    pub fn provider_status(&self, providers: &[ProviderConfig]) -> Vec<ProviderStatus> {
        let preferred = self.preferred();
        let mut ordered: Vec<&ProviderConfig> = providers.iter().collect();
        ordered.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));

        ordered
            .into_iter()
            .map(|p| {
                let snapshot = self.breakers.breaker(&p.id).snapshot();
                ProviderStatus {
                    provider: p.id.clone(),
                    enabled: p.enabled,
                    priority: p.priority,
                    circuit_state: snapshot.state,
                    consecutive_failures: snapshot.consecutive_failures,
                    last_failure: snapshot.last_failure,
                    open_until: snapshot.open_until,
                    cooldown_secs: snapshot.cooldown.as_secs_f64(),
                    last_latency_ms: snapshot.last_latency.map(|l| l.as_secs_f64() * 1000.0),
                    preferred: preferred.as_deref() == Some(p.id.as_str()),
                }
            })
            .collect()
    }
}
