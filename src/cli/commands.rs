//! Subcommand arguments and execution

use anyhow::Result;
use clap::Args;

use crate::config::SonarConfig;
use crate::hierarchy::{HierarchyError, HierarchyReconciler};
use crate::types::{PortfolioHierarchy, PortfolioKey};

#[derive(Args)]
pub struct CreateArgs {
    /// Key of the parent portfolio
    pub key: String,

    /// Child portfolio keys to reference
    #[arg(required = true)]
    pub references: Vec<String>,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Key of the parent portfolio
    pub key: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Key of the parent portfolio
    pub key: String,

    /// New parent key, when renaming the parent
    #[arg(long)]
    pub new_key: Option<String>,

    /// Child references currently held (last-known state)
    #[arg(long = "old", value_delimiter = ',')]
    pub old_references: Vec<String>,

    /// Child references desired after the update
    #[arg(long = "new", value_delimiter = ',')]
    pub new_references: Vec<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Key of the parent portfolio
    pub key: String,

    /// Child references currently held (last-known state)
    #[arg(required = true)]
    pub references: Vec<String>,
}

fn keys(raw: Vec<String>) -> Vec<PortfolioKey> {
    raw.into_iter().map(PortfolioKey::from).collect()
}

pub async fn create(config: &SonarConfig, args: CreateArgs) -> Result<()> {
    let client = config.client();
    let reconciler = HierarchyReconciler::new(&client);

    let desired = PortfolioHierarchy::new(args.key, keys(args.references));
    let state = reconciler.create(&desired).await?;

    println!("Created {} ({})", state.hierarchy.key, state.id);
    print_references(&state.hierarchy);
    Ok(())
}

pub async fn read(config: &SonarConfig, args: ReadArgs) -> Result<()> {
    let client = config.client();
    let reconciler = HierarchyReconciler::new(&client);

    match reconciler.read(&PortfolioKey::from(args.key)).await {
        Ok(hierarchy) => {
            println!("{}", hierarchy.key);
            print_references(&hierarchy);
            Ok(())
        }
        Err(HierarchyError::NotFound { key }) => {
            println!("Portfolio {} does not exist on the server", key);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn update(config: &SonarConfig, args: UpdateArgs) -> Result<()> {
    let client = config.client();
    let reconciler = HierarchyReconciler::new(&client);

    let old_key = PortfolioKey::from(args.key);
    let new_key = args
        .new_key
        .map(PortfolioKey::from)
        .unwrap_or_else(|| old_key.clone());

    let old = PortfolioHierarchy {
        key: old_key,
        references: keys(args.old_references),
    };
    let new = PortfolioHierarchy {
        key: new_key,
        references: keys(args.new_references),
    };

    let state = reconciler.update(&old, &new).await?;
    println!("Updated {} ({})", state.hierarchy.key, state.id);
    print_references(&state.hierarchy);
    Ok(())
}

pub async fn delete(config: &SonarConfig, args: DeleteArgs) -> Result<()> {
    let client = config.client();
    let reconciler = HierarchyReconciler::new(&client);

    let current = PortfolioHierarchy::new(args.key, keys(args.references));
    reconciler.delete(&current).await?;

    println!("Deleted references under {}", current.key);
    Ok(())
}

fn print_references(hierarchy: &PortfolioHierarchy) {
    for reference in &hierarchy.references {
        println!("  - {}", reference);
    }
}
