//! Built-in question set used when the real source cannot be loaded

/// Five Frankfurt landmarks, multiple choice only
pub const EMBEDDED_QUESTIONS: &str = "\
Question,Choice A,Choice B,Choice C,Choice D,Correct Answer,Latitude,Longitude
Which historic church in Frankfurt was the seat of Germany's first National Assembly in 1848?,Alte Oper,Goethe House,Paulskirche (St. Paul's Church),Kaiserdom St. Bartholomäus,Paulskirche (St. Paul's Church),50.1106,8.6821
What is the name of the large public square that features the Römer Frankfurt's city hall since the 15th century?,Opernplatz,Hauptwache,Konstablerwache,Römerberg,Römerberg,50.1105,8.6827
What is the tallest building in Frankfurt and also the EU's second tallest?,Main Tower,Messeturm,Westend Gate,Commerzbank Tower,Commerzbank Tower,50.1109,8.6783
What is the name of Frankfurt's botanical garden home to tropical greenhouses?,Botanischer Garten,Palmengarten,Grüneburgpark,Wallanlagen,Palmengarten,50.118,8.6512
Which museum is located along the Museumsufer and focuses on fine arts?,Museum für Moderne Kunst,Senckenberg Museum,Historisches Museum,Städel Museum,Städel Museum,50.103,8.6742
";
