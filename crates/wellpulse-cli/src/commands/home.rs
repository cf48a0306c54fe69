use wellpulse_core::pages::CardStatus;
use wellpulse_core::HomePage;

use super::CmdResult;

pub fn run(json: bool) -> CmdResult {
    let home = HomePage::new();
    if json {
        println!("{}", serde_json::to_string_pretty(home.cards())?);
        return Ok(());
    }
    println!("WellPulse\n");
    for (i, card) in home.cards().iter().enumerate() {
        let badge = match card.status {
            CardStatus::Active => "",
            CardStatus::Soon => " (soon)",
        };
        println!("  {}. {}{badge}", i + 1, card.title);
        println!("     {}", card.description);
        println!("     wellpulse-cli open {}\n", card.route.fragment());
    }
    Ok(())
}
