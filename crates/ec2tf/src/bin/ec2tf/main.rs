mod cli;

use ec2tf::description::ResourceDescription;
use ec2tf::document::Generator;
use ec2tf::export::RawExport;
use ec2tf::sink::Sink;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("EC2TF_LOG"))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn run(cli: cli::Cli) -> anyhow::Result<()> {
    tracing::info!(
        instance_id = %cli.instance_id,
        region = %cli.region,
        profile = ?cli.profile,
        "describing instance"
    );

    let description = load(&cli.input)?;
    anyhow::ensure!(
        description.instance_id == cli.instance_id,
        "Instance {} not found in {} (description is for {:?})",
        cli.instance_id,
        cli.region,
        description.instance_id,
    );
    summary(&description);

    let generator = Generator::now(Some(cli.region.clone()));
    let document = generator.generate(&description);
    Sink::from(cli.output).write(&document)?;

    if let Some(json_path) = cli.json {
        let json = RawExport::new(&description, Some(cli.region.as_str()), chrono::Utc::now())
            .to_json()?;
        Sink::File(json_path).write(&json)?;
    }

    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<ResourceDescription> {
    let description = match &input.file {
        Some(path) => ResourceDescription::load_file(path, input.format.into())?,
        None => ResourceDescription::from_reader(std::io::stdin().lock(), input.format.into())?,
    };
    Ok(description)
}

fn summary(description: &ResourceDescription) {
    let or_na = |value: Option<&String>| value.map_or("N/A", String::as_str).to_string();

    tracing::info!(
        instance_type = %description.instance_type,
        state = %or_na(description.state.as_ref()),
        ami = %description.image_id,
        vpc = %or_na(description.vpc_id.as_ref()),
        subnet = %or_na(description.subnet_id.as_ref()),
        volumes = description.block_devices.len(),
        interfaces = description.network_interfaces.len(),
        elastic_ips = description.floating_addresses.len(),
        "retrieved instance details"
    );
}
