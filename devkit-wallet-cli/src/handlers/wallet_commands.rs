//! Handler functions for wallet-related commands.

use crate::wallet::{Chain, HdWallet, MnemonicManager, Result, WalletError};
use crate::ui::prompt::Prompt;

/// Handles the init command: seeds a default keystore on first run.
pub fn handle_init(manager: &mut MnemonicManager) -> Result<()> {
    if manager.ensure_initialized()? {
        println!(
            "No keystore found. Default keystore created and activated at {}.",
            manager.store().path().display()
        );
    } else {
        println!("Keystore already initialized ({} entries).", manager.store().entries().len());
    }
    Ok(())
}

/// Handles the add command: interactive entry creation.
pub fn handle_add(manager: &mut MnemonicManager, prompt: &mut dyn Prompt) -> Result<()> {
    let index = manager.add_mnemonic(prompt)?;
    println!("Added entry {index}: {}", manager.store().entries()[index].label);
    Ok(())
}

/// Handles the list command.
pub fn handle_list(manager: &MnemonicManager) -> Result<()> {
    let entries = manager.store().entries();
    if entries.is_empty() {
        println!("No mnemonics found. Run `init` or `add` first.");
        return Ok(());
    }
    let active = manager.store().active_index();
    for (index, entry) in entries.iter().enumerate() {
        let marker = if active == Some(index) { "*" } else { " " };
        println!("{marker} {index}: {} ({})", entry.label, entry.kind_label());
    }
    Ok(())
}

/// Handles the select command. Without an explicit index, the user picks from
/// the labeled entries.
pub fn handle_select(
    manager: &mut MnemonicManager,
    prompt: &mut dyn Prompt,
    index: Option<usize>,
) -> Result<()> {
    let index = match index {
        Some(index) => index,
        None => {
            let entries = manager.store().entries();
            if entries.is_empty() {
                println!("No mnemonics found.");
                return Ok(());
            }
            let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
            prompt.select("Select the active mnemonic:", &labels)?
        }
    };
    manager.select_active(index)?;
    println!("Active wallet set to: {}", manager.active_label()?);
    Ok(())
}

/// Handles the delete command.
pub fn handle_delete(manager: &mut MnemonicManager, index: usize) -> Result<()> {
    let removed = manager.delete_entry(index)?;
    println!("Deleted entry {index}: {}", removed.label);
    Ok(())
}

/// Handles the active command.
pub fn handle_active(manager: &MnemonicManager) -> Result<()> {
    match manager.active_label() {
        Ok(label) => println!("Active wallet: {label}"),
        Err(WalletError::NoActiveMnemonic) => println!("Active wallet: None"),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Handles the derive command: batch-derives accounts for the active
/// mnemonic over an inclusive index range.
pub fn handle_derive(
    manager: &MnemonicManager,
    prompt: &mut dyn Prompt,
    chain: Chain,
    from: u32,
    to: u32,
    core_network_id: u32,
    show_secrets: bool,
) -> Result<()> {
    let phrase = manager.resolve_active_mnemonic(prompt)?;
    let wallet = HdWallet::from_phrase(&phrase, core_network_id)?;

    for account in wallet.derive_batch(chain, from, to)? {
        if show_secrets {
            println!(
                "{chain}/{}: {} {}",
                account.index,
                account.address,
                account.secret_key_hex()
            );
        } else {
            println!("{chain}/{}: {}", account.index, account.address);
        }
    }
    Ok(())
}

/// Handles the address command: prints one account's address.
pub fn handle_address(
    manager: &MnemonicManager,
    prompt: &mut dyn Prompt,
    chain: Chain,
    index: u32,
    core_network_id: u32,
) -> Result<()> {
    let phrase = manager.resolve_active_mnemonic(prompt)?;
    let wallet = HdWallet::from_phrase(&phrase, core_network_id)?;
    let account = wallet.account(chain, index)?;
    println!("{}", account.address);
    Ok(())
}
