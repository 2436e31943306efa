use {
    crate::{
        cli::Cli,
        collector::{collect, list_services},
        report::{OutputSink, Reporter},
    },
    anyhow::{Context, Result},
    limitwatch_auth::{AuthProvider, ConfigFileAuthProvider, InstancePrincipalAuthProvider},
    limitwatch_client::{ClientError, LimitsApi, LimitsClient},
    limitwatch_config::{LimitsConfig, OciProfile},
    log::{debug, info},
    std::{
        io::{self, Write},
        sync::Arc,
    },
};

/// The tenancy to report on. Instance principals always report on their own tenancy; API key profiles use the
/// configured tenancy, falling back to the profile's.
pub fn resolve_tenancy(config: &LimitsConfig, auth: &dyn AuthProvider, instance_principal: bool) -> String {
    if instance_principal {
        if !config.tenancy_id.is_empty() && config.tenancy_id != auth.tenancy_id() {
            info!("Using instance tenancy {} instead of configured {}", auth.tenancy_id(), config.tenancy_id);
        }
        auth.tenancy_id().to_string()
    } else {
        config.tenancy_or(auth.tenancy_id()).to_string()
    }
}

fn auth_provider(cli: &Cli) -> Result<Arc<dyn AuthProvider>> {
    if cli.instance_principal {
        let provider =
            InstancePrincipalAuthProvider::new().context("Unable to obtain instance principal credentials")?;
        return Ok(Arc::new(provider));
    }

    let path = match &cli.oci_config {
        Some(path) => path.clone(),
        None => OciProfile::default_path().context("Unable to locate the home directory; use --oci-config")?,
    };

    let provider = ConfigFileAuthProvider::from_file(&path, &cli.profile)
        .with_context(|| format!("Unable to load profile [{}] from {}", cli.profile, path.display()))?;
    Ok(Arc::new(provider))
}

/// Write the name of every service available to the tenancy, one per line.
pub fn report_services<A: LimitsApi, W: Write>(api: &A, tenancy_id: &str, out: &mut W) -> io::Result<()> {
    for service in list_services(api, tenancy_id) {
        writeln!(out, "{}", service.name)?;
    }
    out.flush()
}

/// Collect and write one section per configured region, in configuration order. `api_for_region` supplies the API
/// handle for each region.
pub fn report_regions<A, F, W, S>(
    mut api_for_region: F,
    tenancy_id: &str,
    config: &LimitsConfig,
    reporter: &mut Reporter<W, S>,
) -> Result<()>
where
    A: LimitsApi,
    F: FnMut(&str) -> Result<A, ClientError>,
    W: Write,
    S: Write,
{
    for region in &config.regions {
        let api = api_for_region(region).with_context(|| format!("Unable to create a client for {region}"))?;
        let records = collect(&api, tenancy_id, &config.services, region);
        reporter.write_region(region, &records).with_context(|| format!("Unable to write the report for {region}"))?;
    }
    Ok(())
}

pub fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.limits_config_path();
    let config = LimitsConfig::read_file(&config_path)
        .with_context(|| format!("Unable to read configuration file {}", config_path.display()))?;
    debug!("Configuration: {:?}", config);

    let auth = auth_provider(cli)?;
    let tenancy_id = resolve_tenancy(&config, auth.as_ref(), cli.instance_principal);
    info!("Reporting on tenancy {}", tenancy_id);

    if cli.services_only {
        let client = LimitsClient::for_region(auth.region(), auth.clone())?;
        return Ok(report_services(&client, &tenancy_id, &mut io::stdout().lock())?);
    }

    let sink = OutputSink::open(cli.ofile.as_deref()).with_context(|| match &cli.ofile {
        Some(path) => format!("Unable to open output file {}", path.display()),
        None => "Unable to open standard output".to_string(),
    })?;
    let mut reporter = Reporter::new(sink, io::stdout());

    report_regions(|region| LimitsClient::for_region(region, auth.clone()), &tenancy_id, &config, &mut reporter)?;

    let summary = reporter.finish()?;
    info!(
        "Reported {} limits in {} regions; {} exhausted",
        summary.records, summary.regions, summary.exhausted
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::resolve_tenancy,
        limitwatch_auth::{AuthError, AuthProvider},
        limitwatch_config::LimitsConfig,
        limitwatch_signature::SigningKey,
        pretty_assertions::assert_eq,
    };

    struct Tenancy(&'static str);

    impl AuthProvider for Tenancy {
        fn tenancy_id(&self) -> &str {
            self.0
        }

        fn region(&self) -> &str {
            "us-phoenix-1"
        }

        fn signing_key(&self) -> Result<SigningKey, AuthError> {
            Err(AuthError::TenancyNotFound)
        }
    }

    fn config(tenancy_id: &str) -> LimitsConfig {
        LimitsConfig {
            tenancy_id: tenancy_id.to_string(),
            ..Default::default()
        }
    }

    #[test_log::test]
    fn profile_prefers_configured_tenancy() {
        let auth = Tenancy("ocid1.tenancy.oc1..profile");
        let configured = config("ocid1.tenancy.oc1..configured");
        assert_eq!(resolve_tenancy(&configured, &auth, false), "ocid1.tenancy.oc1..configured");
        assert_eq!(resolve_tenancy(&config(""), &auth, false), "ocid1.tenancy.oc1..profile");
    }

    #[test_log::test]
    fn instance_principal_overrides_configured_tenancy() {
        let auth = Tenancy("ocid1.tenancy.oc1..instance");
        let configured = config("ocid1.tenancy.oc1..configured");
        assert_eq!(resolve_tenancy(&configured, &auth, true), "ocid1.tenancy.oc1..instance");
        assert_eq!(resolve_tenancy(&config(""), &auth, true), "ocid1.tenancy.oc1..instance");
    }
}
