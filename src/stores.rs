// Storefront id → display name directory
//
// Mirrors the deal feed's store directory as shipped; id 23 is absent
// upstream. `CheapSharkClient::stores` fetches the live directory when a
// fresher view is needed.

pub fn store_name(store_id: &str) -> Option<&'static str> {
    let name = match store_id {
        "1" => "Steam",
        "2" => "GamersGate",
        "3" => "GreenManGaming",
        "4" => "Amazon",
        "5" => "Newegg",
        "6" => "Razer Game Store",
        "7" => "GOG",
        "8" => "Origin",
        "9" => "IndieGameStand",
        "10" => "Desura",
        "11" => "Humble Store",
        "12" => "All Deals",
        "13" => "Ubisoft Connect",
        "14" => "Direct2Drive",
        "15" => "Fanatical",
        "16" => "Gamesload",
        "17" => "Voidu",
        "18" => "GameBillet",
        "19" => "Gamesplanet",
        "20" => "2Game",
        "21" => "GMG",
        "22" => "WinGameStore",
        "24" => "GamesRocket",
        "25" => "Epic Games",
        "26" => "Blizzard Shop",
        "27" => "Nintendo",
        "28" => "Meta Quest",
        _ => return None,
    };
    Some(name)
}

pub fn display_name(store_id: &str) -> &'static str {
    store_name(store_id).unwrap_or("Unknown")
}
