use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use prodstruct_cli::{commands, Catalog, CliConfig, LogConfig};
use prodstruct_model::ProductId;
use tracing_subscriber::EnvFilter;

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn product_arg() -> Arg {
    Arg::new("product")
        .long("product")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Id of a stored product")
}

fn main() -> anyhow::Result<()> {
    let cli = Command::new("prodstruct")
        .version(prodstruct_cli::VERSION)
        .about("Product-structure conversion and storage mapping")
        .subcommand_required(true)
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .global(true)
                .help("JSON catalog of types, workplans and products"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode a stored product")
                .arg(product_arg())
                .arg(
                    Arg::new("flat")
                        .long("flat")
                        .action(ArgAction::SetTrue)
                        .help("Emit only the scalar fields"),
                ),
        )
        .subcommand(
            Command::new("apply")
                .about("Decode a product model into the store and print the result")
                .arg(
                    Arg::new("model")
                        .long("model")
                        .required(true)
                        .help("JSON file holding the product model"),
                ),
        )
        .subcommand(
            Command::new("definitions")
                .about("Describe product types")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help("Tag of one type; all types when omitted"),
                ),
        )
        .subcommand(
            Command::new("slots")
                .about("Project a stored product onto its storage row")
                .arg(product_arg()),
        )
        .subcommand(
            Command::new("rewrite")
                .about("Rewrite a JSON property predicate into a storage-slot predicate")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("Tag of the product type"),
                )
                .arg(
                    Arg::new("where")
                        .long("where")
                        .required(true)
                        .help("Predicate over declared properties, as JSON"),
                ),
        )
        .subcommand(
            Command::new("layout")
                .about("Print or allocate the storage layout of a type")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("Tag of the product type"),
                ),
        );

    let matches = cli.get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => CliConfig::from_path(path)?,
        None => CliConfig::default(),
    };
    init_logging(&config.log);

    let catalog = match matches.get_one::<String>("catalog") {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::default(),
    };
    let session = catalog.load(config.converter)?;

    let output = match matches.subcommand() {
        Some(("encode", args)) => {
            let id = ProductId::new(*args.get_one::<i64>("product").context("missing --product")?);
            commands::encode(&session, id, args.get_flag("flat"))?
        }
        Some(("apply", args)) => {
            let path = args.get_one::<String>("model").context("missing --model")?;
            let model = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {path}"))?;
            commands::apply(&session, &model)?
        }
        Some(("definitions", args)) => {
            commands::definitions(&session, args.get_one::<String>("type").map(String::as_str))?
        }
        Some(("slots", args)) => {
            let id = ProductId::new(*args.get_one::<i64>("product").context("missing --product")?);
            commands::slots(&session, &config.storage, id)?
        }
        Some(("rewrite", args)) => {
            let tag = args.get_one::<String>("type").context("missing --type")?;
            let predicate = args.get_one::<String>("where").context("missing --where")?;
            commands::rewrite(&session, &config.storage, tag, predicate)?
        }
        Some(("layout", args)) => {
            let tag = args.get_one::<String>("type").context("missing --type")?;
            commands::layout(&session, &config.storage, tag)?
        }
        _ => return Ok(()),
    };
    println!("{output}");
    Ok(())
}
